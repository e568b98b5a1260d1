//! Class universe and type hierarchy
//!
//! - `domain`: class/field/method descriptions, generic signatures
//! - `infrastructure`: `ClassHierarchy` queries and primordial JDK stubs

pub mod domain;
pub mod infrastructure;

pub use domain::{Access, ClassInfo, ClassScope, FieldInfo, MethodInfo, TypeArgument, TypeSignature};
pub use infrastructure::ClassHierarchy;
