//! Domain models for synthetic stream classes

pub mod synthetic_class;
pub mod synthetic_method;

pub use synthetic_class::SyntheticClass;
pub use synthetic_method::{ContextState, SyntheticMethod};
