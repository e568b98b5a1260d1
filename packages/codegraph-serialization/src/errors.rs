//! Error types for codegraph-serialization
//!
//! Non-fatal conditions (unresolvable allocation types, missing abstract
//! objects during field instrumentation) are logged and skipped instead of
//! surfacing here.

use crate::config::ConfigError;
use crate::features::callgraph::domain::NodeId;
use thiserror::Error;

/// Main error type for serialization-aware call-graph construction
#[derive(Debug, Error)]
pub enum SerializationError {
    /// The progress monitor requested cancellation
    #[error("Analysis cancelled")]
    Cancelled,

    /// A synthetic stream model could not be built
    #[error("Cannot build model for {class}: {reason}")]
    ModelConstruction { class: String, reason: String },

    /// Node id not present in the call graph
    #[error("Unknown call graph node: {0:?}")]
    UnknownNode(NodeId),

    /// Method referenced by an entry point or call is missing
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Malformed JVM descriptor
    #[error("Descriptor error: {0}")]
    Descriptor(String),

    /// Malformed generic signature
    #[error("Generic signature error: {0}")]
    GenericSignature(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SerializationError {
    /// Create a model construction error
    pub fn model(class: impl ToString, reason: impl Into<String>) -> Self {
        SerializationError::ModelConstruction {
            class: class.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a descriptor error
    pub fn descriptor(msg: impl Into<String>) -> Self {
        SerializationError::Descriptor(msg.into())
    }

    /// Whether this error is a cancellation signal
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SerializationError::Cancelled)
    }
}

/// Result type alias for serialization analysis operations
pub type Result<T> = std::result::Result<T, SerializationError>;
