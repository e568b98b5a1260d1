//! Worklist entries recorded when a stream call is replaced by a model node

pub mod worklist;

pub use worklist::{DeserializationWork, SerializationWork, SerializationWorklists};
