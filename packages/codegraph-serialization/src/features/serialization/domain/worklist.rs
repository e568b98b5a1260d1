use crate::features::callgraph::domain::NodeId;
use crate::features::ir::InvokeInstruction;
use std::collections::BTreeSet;

/// `writeObject(Object)` call redirected to the output stream model
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SerializationWork {
    pub caller: NodeId,
    pub invoke: InvokeInstruction,
    /// Model node that replaced the real entry point
    pub target: NodeId,
}

/// `readObject()` call redirected to the input stream model
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeserializationWork {
    pub caller: NodeId,
    pub invoke: InvokeInstruction,
    /// Model node that replaced the real entry point
    pub target: NodeId,
}

/// Pending entries of both kinds; duplicates collapse
#[derive(Debug, Clone, Default)]
pub struct SerializationWorklists {
    serialization: BTreeSet<SerializationWork>,
    deserialization: BTreeSet<DeserializationWork>,
}

impl SerializationWorklists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the entry was already pending
    pub fn record_serialization(&mut self, work: SerializationWork) -> bool {
        self.serialization.insert(work)
    }

    pub fn record_deserialization(&mut self, work: DeserializationWork) -> bool {
        self.deserialization.insert(work)
    }

    /// Take every pending serialization entry, leaving the list empty
    pub fn drain_serialization(&mut self) -> Vec<SerializationWork> {
        std::mem::take(&mut self.serialization).into_iter().collect()
    }

    /// Take every pending deserialization entry, leaving the list empty
    pub fn drain_deserialization(&mut self) -> Vec<DeserializationWork> {
        std::mem::take(&mut self.deserialization)
            .into_iter()
            .collect()
    }

    pub fn serialization_len(&self) -> usize {
        self.serialization.len()
    }

    pub fn deserialization_len(&self) -> usize {
        self.deserialization.len()
    }

    pub fn len(&self) -> usize {
        self.serialization.len() + self.deserialization.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serialization.is_empty() && self.deserialization.is_empty()
    }
}
