pub mod dispatchers;
pub mod type_resolver;

pub use dispatchers::{DefaultDispatcher, SerializationDispatcher, UnsoundSerializationDispatcher};
pub use type_resolver::{is_accessible, TypeResolver};
