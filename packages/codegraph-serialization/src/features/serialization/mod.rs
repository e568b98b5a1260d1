//! Serialization/Deserialization Handler
//!
//! `SerializationHooks` swaps application calls to `readObject()` and
//! `writeObject(Object)` for model nodes and queues them; the
//! `SerializationHandler` then writes model bodies from the current
//! points-to facts, one round at a time.

pub mod domain;
pub mod infrastructure;

pub use domain::{DeserializationWork, SerializationWork, SerializationWorklists};
pub use infrastructure::{HandlerRound, SerializationHandler, SerializationHooks};
