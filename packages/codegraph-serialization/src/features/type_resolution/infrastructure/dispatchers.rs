//! Dispatch strategies

use super::type_resolver::{is_accessible, TypeResolver};
use crate::features::callgraph::domain::CallGraphNode;
use crate::features::hierarchy::ClassHierarchy;
use crate::features::ir::InvokeInstruction;
use crate::features::type_resolution::ports::Dispatcher;
use crate::shared::models::TypeRef;
use std::collections::BTreeSet;

/// Declaring classes of the CHA targets
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDispatcher;

impl Dispatcher for DefaultDispatcher {
    fn describe(&self) -> String {
        "cha".to_string()
    }

    fn possible_types_for_call(
        &self,
        hierarchy: &ClassHierarchy,
        _caller: &CallGraphNode,
        invoke: &InvokeInstruction,
    ) -> Option<BTreeSet<TypeRef>> {
        Some(
            hierarchy
                .possible_targets(&invoke.site.target)
                .into_iter()
                .map(|m| m.declaring_class)
                .collect(),
        )
    }
}

/// CHA targets restricted to serializable classes the caller can reach
pub struct SerializationDispatcher {
    resolver: TypeResolver,
}

impl SerializationDispatcher {
    pub fn new(resolver: TypeResolver) -> Self {
        Self { resolver }
    }
}

impl Dispatcher for SerializationDispatcher {
    fn describe(&self) -> String {
        "serialization".to_string()
    }

    fn possible_types_for_call(
        &self,
        hierarchy: &ClassHierarchy,
        caller: &CallGraphNode,
        invoke: &InvokeInstruction,
    ) -> Option<BTreeSet<TypeRef>> {
        let Some(from) = hierarchy.lookup(&caller.method.declaring_class) else {
            return Some(BTreeSet::new());
        };
        let candidates: BTreeSet<TypeRef> = hierarchy
            .possible_targets(&invoke.site.target)
            .into_iter()
            .filter_map(|m| hierarchy.lookup(&m.declaring_class))
            .filter(|c| self.resolver.is_serializable(&c.name))
            .filter(|c| c.is_concrete() && is_accessible(from, c))
            .map(|c| c.name.clone())
            .collect();
        Some(self.resolver.prune(hierarchy, candidates))
    }
}

/// No opinion; the client keeps its own resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsoundSerializationDispatcher;

impl Dispatcher for UnsoundSerializationDispatcher {
    fn describe(&self) -> String {
        "unsound".to_string()
    }

    fn possible_types_for_call(
        &self,
        _hierarchy: &ClassHierarchy,
        _caller: &CallGraphNode,
        _invoke: &InvokeInstruction,
    ) -> Option<BTreeSet<TypeRef>> {
        None
    }
}
