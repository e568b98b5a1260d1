//! Routing decision shared by the three delegating facades

use crate::features::callgraph::domain::{CallGraphNode, NodeKind};
use std::fmt;

/// Which configured policy answers a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicySide {
    /// Ordinary program code
    Primary,

    /// Synthetic model nodes
    Secondary,
}

impl PolicySide {
    /// The single membership test every facade applies
    pub fn for_node(node: &CallGraphNode) -> Self {
        match node.kind {
            NodeKind::Ordinary => PolicySide::Primary,
            NodeKind::Model => PolicySide::Secondary,
        }
    }
}

impl fmt::Display for PolicySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicySide::Primary => write!(f, "primary"),
            PolicySide::Secondary => write!(f, "secondary"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::callgraph::domain::{Context, NodeId};
    use crate::shared::models::{MethodRef, Selector, TypeRef};

    #[test]
    fn test_side_follows_node_kind() {
        let mut node = CallGraphNode {
            id: NodeId(0),
            method: MethodRef::new(TypeRef::new("LA"), Selector::new("m", "()V")),
            context: Context::Everywhere,
            kind: NodeKind::Ordinary,
        };
        assert_eq!(PolicySide::for_node(&node), PolicySide::Primary);
        node.kind = NodeKind::Model;
        assert_eq!(PolicySide::for_node(&node), PolicySide::Secondary);
    }
}
