use super::instance_key::InstanceKeyId;
use crate::features::callgraph::domain::NodeId;
use crate::features::ir::ValueId;
use crate::shared::models::FieldRef;
use std::fmt;

/// Abstract pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointerKey {
    /// Local value number of a node
    Local { node: NodeId, value: ValueId },

    /// Field of an abstract object
    InstanceField {
        instance: InstanceKeyId,
        field: FieldRef,
    },

    /// Contents of an abstract array
    ArrayContents { instance: InstanceKeyId },

    ReturnValue { node: NodeId },

    ExceptionalReturn { node: NodeId },
}

impl PointerKey {
    pub fn local(node: NodeId, value: ValueId) -> Self {
        PointerKey::Local { node, value }
    }

    pub fn field(instance: InstanceKeyId, field: FieldRef) -> Self {
        PointerKey::InstanceField { instance, field }
    }
}

impl fmt::Display for PointerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerKey::Local { node, value } => write!(f, "[Node#{} v{}]", node.0, value),
            PointerKey::InstanceField { instance, field } => {
                write!(f, "[Obj#{}.{}]", instance.0, field.name)
            }
            PointerKey::ArrayContents { instance } => write!(f, "[Obj#{}[]]", instance.0),
            PointerKey::ReturnValue { node } => write!(f, "[Node#{} ret]", node.0),
            PointerKey::ExceptionalReturn { node } => write!(f, "[Node#{} exc]", node.0),
        }
    }
}
