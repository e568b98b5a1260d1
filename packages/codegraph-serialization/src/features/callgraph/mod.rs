//! Context-sensitive call graph
//!
//! Nodes carry their `NodeKind`, so whether a node is a synthetic model
//! node is known from the node itself.

pub mod domain;
pub mod infrastructure;

pub use domain::{CallGraphNode, CallStringElement, Context, NodeId, NodeKind};
pub use infrastructure::CallGraph;
