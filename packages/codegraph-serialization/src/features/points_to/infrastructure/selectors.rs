//! Context selectors

use super::instance_keys::ZeroXInstanceKeys;
use crate::features::callgraph::domain::{CallGraphNode, Context};
use crate::features::hierarchy::ClassHierarchy;
use crate::features::ir::CallSiteRef;
use crate::features::points_to::domain::{InstanceKey, InstanceKeyId};
use crate::features::points_to::ports::{ContextSelector, ProgramView};
use crate::shared::models::names::{JAVA_UTIL_LIST, JAVA_UTIL_MAP, JAVA_UTIL_SET};
use crate::shared::models::{MethodRef, TypeRef};
use std::sync::Arc;

/// Context-insensitive selection
#[derive(Debug, Clone, Copy, Default)]
pub struct EverywhereContextSelector;

impl ContextSelector for EverywhereContextSelector {
    fn describe(&self) -> String {
        "everywhere".to_string()
    }

    fn callee_context(
        &self,
        _caller: &CallGraphNode,
        _site: &CallSiteRef,
        _callee: &MethodRef,
        _receiver: Option<(InstanceKeyId, &InstanceKey)>,
        _program: &ProgramView<'_>,
    ) -> Option<Context> {
        Some(Context::Everywhere)
    }
}

/// k-limited call strings
#[derive(Debug, Clone, Copy)]
pub struct CallStringContextSelector {
    length: usize,
}

impl CallStringContextSelector {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl ContextSelector for CallStringContextSelector {
    fn describe(&self) -> String {
        format!("call-string({})", self.length)
    }

    fn callee_context(
        &self,
        caller: &CallGraphNode,
        site: &CallSiteRef,
        _callee: &MethodRef,
        _receiver: Option<(InstanceKeyId, &InstanceKey)>,
        _program: &ProgramView<'_>,
    ) -> Option<Context> {
        Some(
            caller
                .context
                .push_call_site(&caller.method, site.pc, self.length),
        )
    }
}

/// Receiver-object contexts for List/Set/Map receivers
///
/// A receiver only gets its own context when the ZeroX factory gave it a
/// per-site key; smushed objects fall through to `fallback`.
pub struct ContainerContextSelector {
    keys: Arc<ZeroXInstanceKeys>,
    fallback: Arc<dyn ContextSelector>,
}

impl ContainerContextSelector {
    pub fn new(keys: Arc<ZeroXInstanceKeys>, fallback: Arc<dyn ContextSelector>) -> Self {
        Self { keys, fallback }
    }
}

/// Whether `ty` is a List, Set or Map
pub fn is_container_type(hierarchy: &ClassHierarchy, ty: &TypeRef) -> bool {
    [JAVA_UTIL_LIST, JAVA_UTIL_SET, JAVA_UTIL_MAP]
        .iter()
        .any(|container| hierarchy.is_assignable_from(&TypeRef::new(container), ty))
}

impl ContextSelector for ContainerContextSelector {
    fn describe(&self) -> String {
        format!(
            "container({}, else {})",
            self.keys.describe_bound(),
            self.fallback.describe()
        )
    }

    fn callee_context(
        &self,
        caller: &CallGraphNode,
        site: &CallSiteRef,
        callee: &MethodRef,
        receiver: Option<(InstanceKeyId, &InstanceKey)>,
        program: &ProgramView<'_>,
    ) -> Option<Context> {
        if let Some((id, key)) = receiver {
            if self.keys.distinguishes(key)
                && is_container_type(program.hierarchy, key.concrete_type())
            {
                return Some(Context::Receiver(id));
            }
        }
        self.fallback
            .callee_context(caller, site, callee, receiver, program)
    }
}

/// First selector with an opinion wins
pub struct FallbackContextSelector {
    first: Arc<dyn ContextSelector>,
    fallback: Arc<dyn ContextSelector>,
}

impl FallbackContextSelector {
    pub fn new(first: Arc<dyn ContextSelector>, fallback: Arc<dyn ContextSelector>) -> Self {
        Self { first, fallback }
    }
}

impl ContextSelector for FallbackContextSelector {
    fn describe(&self) -> String {
        format!("{} | {}", self.first.describe(), self.fallback.describe())
    }

    fn callee_context(
        &self,
        caller: &CallGraphNode,
        site: &CallSiteRef,
        callee: &MethodRef,
        receiver: Option<(InstanceKeyId, &InstanceKey)>,
        program: &ProgramView<'_>,
    ) -> Option<Context> {
        self.first
            .callee_context(caller, site, callee, receiver, program)
            .or_else(|| {
                self.fallback
                    .callee_context(caller, site, callee, receiver, program)
            })
    }
}
