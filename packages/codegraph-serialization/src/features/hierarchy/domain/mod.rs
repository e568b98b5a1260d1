//! Domain models for the class universe

pub mod class_info;
pub mod generic_signature;

pub use class_info::{Access, ClassInfo, ClassScope, FieldInfo, MethodInfo};
pub use generic_signature::{TypeArgument, TypeSignature};
