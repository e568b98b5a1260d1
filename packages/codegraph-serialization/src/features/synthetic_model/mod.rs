//! Synthetic Method Model
//!
//! Fabricated stand-ins for the stream classes whose entry-point bodies are
//! written incrementally, one body per calling context.
//!
//! - `domain`: `SyntheticMethod`, `ContextState`, `SyntheticClass`
//! - `infrastructure`: `StreamModels` (body source for the engine) and the
//!   model interpreter

pub mod domain;
pub mod infrastructure;

pub use domain::{ContextState, SyntheticClass, SyntheticMethod};
pub use infrastructure::{ModelContextInterpreter, StreamModels};
