//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure data and invariants
//! - ports/      - Interface definitions (traits)
//! - infrastructure/ - Implementations

// Host engine
pub mod callgraph;
pub mod hierarchy;
pub mod ir;
pub mod points_to;

// Precision policies and their per-node routing
pub mod delegation;
pub mod policy;

// Stream modeling
pub mod serialization;
pub mod synthetic_model;
pub mod type_resolution;

pub mod fixpoint;
