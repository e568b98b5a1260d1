//! Domain models for points-to analysis
//!
//! - InstanceKey: abstract runtime objects and their interning table
//! - PointerKey: abstract pointers (locals, fields, array contents, returns)

pub mod instance_key;
pub mod pointer_key;

pub use instance_key::{CreationSite, InstanceKey, InstanceKeyId, InstanceKeyTable};
pub use pointer_key::PointerKey;
