use super::context::Context;
use crate::shared::models::MethodRef;
use std::fmt;

/// Dense index of a call-graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Which policy governs a node; fixed when the node is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// Real program code, governed by the primary policy
    #[default]
    Ordinary,

    /// Synthetic stream model, governed by the secondary policy
    Model,
}

/// (method, context) pair of the call graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallGraphNode {
    pub id: NodeId,
    pub method: MethodRef,
    pub context: Context,
    pub kind: NodeKind,
}

impl CallGraphNode {
    pub fn is_model(&self) -> bool {
        self.kind == NodeKind::Model
    }
}

impl fmt::Display for CallGraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node#{} {} in {}", self.id.0, self.method, self.context)?;
        if self.is_model() {
            write!(f, " (model)")?;
        }
        Ok(())
    }
}
