/*
 * Codegraph Serialization - serialization-aware call-graph construction
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : JVM names, descriptors, well-known serialization selectors
 * - config/      : AnalysisConfig (policy pair, pruning, round limit), YAML v1
 * - features/    : host engine (hierarchy → ir → callgraph → points_to) and the
 *                  extension (policy → delegation → synthetic_model →
 *                  type_resolution → serialization → fixpoint)
 *
 * Calls to ObjectInputStream.readObject() and ObjectOutputStream.writeObject()
 * from application code are redirected to synthetic model nodes whose bodies
 * are written round by round from the current points-to facts, so the
 * reflective callbacks (readObject, readResolve, writeReplace, ...) end up in
 * the call graph.
 */

#![allow(clippy::too_many_arguments)] // Handler helpers thread engine, hooks and model together
#![allow(clippy::type_complexity)] // Dedup keys are tuples of references
#![allow(clippy::module_inception)] // Module naming intentional

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Configuration (policies, pruning, YAML schema)
pub mod config;

/// Crate error type
pub mod errors;

/// Vertical slices
pub mod features;

/// Shared models and names
pub mod shared;

// ═══════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{AnalysisConfig, ConfigError, PruningConfig};
pub use errors::{Result, SerializationError};
pub use features::callgraph::{CallGraph, CallGraphNode, Context, NodeId, NodeKind};
pub use features::delegation::{DelegatingPolicies, DelegationBuilder, PolicySide};
pub use features::fixpoint::{
    CallGraphResult, DriverStats, FixedPointDriver, SerializationCallGraphBuilder,
};
pub use features::hierarchy::{Access, ClassHierarchy, ClassInfo, ClassScope, FieldInfo, MethodInfo};
pub use features::ir::{Dispatch, Instruction, InstructionFactory, MethodBody, NewSiteRef};
pub use features::points_to::{
    InstanceKey, InstanceKeyId, NullMonitor, PointerKey, ProgressMonitor, PropagationEngine,
    TracingMonitor,
};
pub use features::policy::{Policy, PolicyKind};
pub use features::serialization::{SerializationHandler, SerializationHooks};
pub use features::synthetic_model::StreamModels;
pub use features::type_resolution::{Dispatcher, TypeCategory, TypeResolver};
pub use shared::models::{FieldRef, MethodRef, Selector, TypeRef};
