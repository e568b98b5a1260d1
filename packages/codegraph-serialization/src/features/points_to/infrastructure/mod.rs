//! Reference host engine and its policy implementations

pub mod engine;
pub mod hooks;
pub mod instance_keys;
pub mod interpreters;
pub mod ir_cache;
pub mod monitor;
pub mod selectors;
pub mod slicer;

pub use engine::{EngineStats, PropagationEngine};
pub use hooks::BasicHooks;
pub use instance_keys::{AllocationSiteInstanceKeys, ClassBasedInstanceKeys, ZeroXInstanceKeys};
pub use interpreters::{DefaultContextInterpreter, FallbackContextInterpreter};
pub use ir_cache::IrCache;
pub use monitor::{CancelAfter, NullMonitor, TracingMonitor};
pub use selectors::{
    is_container_type, CallStringContextSelector, ContainerContextSelector,
    EverywhereContextSelector, FallbackContextSelector,
};
pub use slicer::{DataDependenceSlicer, SliceSeed, SliceStatement};
