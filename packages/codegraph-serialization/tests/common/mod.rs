//! Common test utilities for codegraph-serialization
//!
//! Shared class universes, body/harness builders and call-graph assertions
//! for the integration tests.

#![allow(dead_code)]

mod assertions;
mod builders;
mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
