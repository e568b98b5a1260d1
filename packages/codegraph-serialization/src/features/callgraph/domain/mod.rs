//! Domain models for the call graph

pub mod context;
pub mod node;

pub use context::{CallStringElement, Context};
pub use node::{CallGraphNode, NodeId, NodeKind};
