//! Fixed-Point Driver
//!
//! Alternates engine propagation with model instrumentation until neither
//! produces new work, and packages the outcome as a `CallGraphResult`.

pub mod domain;
pub mod infrastructure;

pub use domain::{CallGraphResult, DriverStats};
pub use infrastructure::{FixedPointDriver, SerializationCallGraphBuilder};
