//! Abstract objects (instance keys)

use crate::features::callgraph::domain::NodeId;
use crate::features::ir::NewSiteRef;
use crate::shared::models::{MethodRef, TypeRef};
use rustc_hash::FxHashMap;

/// Interned instance key index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKeyId(pub u32);

/// Symbolic runtime object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstanceKey {
    /// Allocation site cloned per call-graph node (heap context = node context)
    AllocationInNode { node: NodeId, site: NewSiteRef },

    /// Context-insensitive allocation site
    AllocationSite { method: MethodRef, site: NewSiteRef },

    /// All objects of one type
    ClassBased { concrete_type: TypeRef },

    /// Type fact without an allocation site
    ConcreteType { concrete_type: TypeRef },

    Constant { concrete_type: TypeRef },

    /// Exception raised by an instruction at `pc`
    Pei {
        node: NodeId,
        pc: u32,
        concrete_type: TypeRef,
    },

    /// Reflective class metadata object
    Metadata { concrete_type: TypeRef },
}

impl InstanceKey {
    pub fn concrete_type(&self) -> &TypeRef {
        match self {
            InstanceKey::AllocationInNode { site, .. } | InstanceKey::AllocationSite { site, .. } => {
                &site.declared_type
            }
            InstanceKey::ClassBased { concrete_type }
            | InstanceKey::ConcreteType { concrete_type }
            | InstanceKey::Constant { concrete_type }
            | InstanceKey::Pei { concrete_type, .. }
            | InstanceKey::Metadata { concrete_type } => concrete_type,
        }
    }

    /// Placeholder objects carry no allocation site
    pub fn is_placeholder(&self) -> bool {
        matches!(self, InstanceKey::ConcreteType { .. })
    }

    /// Whether the key distinguishes individual allocation sites
    pub fn is_allocation(&self) -> bool {
        matches!(
            self,
            InstanceKey::AllocationInNode { .. } | InstanceKey::AllocationSite { .. }
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            InstanceKey::AllocationInNode { .. } => "allocation-in-node",
            InstanceKey::AllocationSite { .. } => "allocation-site",
            InstanceKey::ClassBased { .. } => "class-based",
            InstanceKey::ConcreteType { .. } => "concrete-type",
            InstanceKey::Constant { .. } => "constant",
            InstanceKey::Pei { .. } => "pei",
            InstanceKey::Metadata { .. } => "metadata",
        }
    }
}

/// Allocation of an abstract object: node plus `new` site
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreationSite {
    pub node: NodeId,
    pub site: NewSiteRef,
}

/// Interning table for instance keys
#[derive(Debug, Default)]
pub struct InstanceKeyTable {
    keys: Vec<InstanceKey>,
    index: FxHashMap<InstanceKey, InstanceKeyId>,
}

impl InstanceKeyTable {
    pub fn intern(&mut self, key: InstanceKey) -> InstanceKeyId {
        if let Some(id) = self.index.get(&key) {
            return *id;
        }
        let id = InstanceKeyId(self.keys.len() as u32);
        self.keys.push(key.clone());
        self.index.insert(key, id);
        id
    }

    pub fn get(&self, id: InstanceKeyId) -> Option<&InstanceKey> {
        self.keys.get(id.0 as usize)
    }

    pub fn lookup(&self, key: &InstanceKey) -> Option<InstanceKeyId> {
        self.index.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
