//! Context-sensitivity policy descriptor
//!
//! Two policies coexist per run: the primary one governs ordinary code, the
//! secondary one governs synthetic model nodes.

pub mod domain;

pub use domain::{Policy, PolicyKind};
