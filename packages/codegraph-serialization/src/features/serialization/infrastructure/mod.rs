//! Stream-call substitution and model instrumentation

pub mod handler;
pub mod hooks;

pub use handler::{HandlerRound, SerializationHandler};
pub use hooks::SerializationHooks;
