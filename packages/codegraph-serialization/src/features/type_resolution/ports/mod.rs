//! Pluggable dispatch strategy for client analyses

use crate::features::callgraph::domain::CallGraphNode;
use crate::features::hierarchy::ClassHierarchy;
use crate::features::ir::InvokeInstruction;
use crate::shared::models::TypeRef;
use std::collections::BTreeSet;

/// Computes which concrete types a virtual call may be dispatched on
pub trait Dispatcher {
    fn describe(&self) -> String;

    /// Receiver types for `invoke` in `caller`; None lets the client resolve it itself
    fn possible_types_for_call(
        &self,
        hierarchy: &ClassHierarchy,
        caller: &CallGraphNode,
        invoke: &InvokeInstruction,
    ) -> Option<BTreeSet<TypeRef>>;
}
