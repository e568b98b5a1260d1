//! Points-to analysis host
//!
//! Hexagonal layout:
//! - `domain`: abstract objects and pointers
//! - `ports`: policy traits consulted by the engine
//! - `infrastructure`: propagation engine, policies, slicer, monitors

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{CreationSite, InstanceKey, InstanceKeyId, InstanceKeyTable, PointerKey};
pub use infrastructure::{
    BasicHooks, DataDependenceSlicer, NullMonitor, PropagationEngine, SliceSeed, SliceStatement,
    TracingMonitor,
};
pub use ports::{
    ContextInterpreter, ContextSelector, DispatchRequest, InstanceKeyFactory, ProgramView,
    ProgressMonitor, PropagationHooks, SyntheticBodies,
};
