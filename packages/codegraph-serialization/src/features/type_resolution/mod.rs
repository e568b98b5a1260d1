//! Type/Dispatch Resolver
//!
//! Computes the possible concrete runtime types of a field or a call
//! receiver from the statically known serializable classes.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::TypeCategory;
pub use infrastructure::{
    is_accessible, DefaultDispatcher, SerializationDispatcher, TypeResolver,
    UnsoundSerializationDispatcher,
};
pub use ports::Dispatcher;
