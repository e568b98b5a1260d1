//! Shared models

pub mod descriptor;
pub mod names;
mod types;

pub use descriptor::{parse_method_descriptor, MethodDescriptor};
pub use types::{FieldRef, MethodRef, Selector, TypeRef};
