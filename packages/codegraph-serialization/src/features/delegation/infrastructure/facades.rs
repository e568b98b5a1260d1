//! Delegating facades
//!
//! Each facade holds one implementation per side and forwards a query to
//! `PolicySide::for_node` of the node it is about. Constant and metadata
//! objects have no owning node and always go to the primary factory.

use crate::features::callgraph::domain::{CallGraphNode, Context};
use crate::features::delegation::domain::PolicySide;
use crate::features::ir::{CallSiteRef, MethodBody, NewSiteRef};
use crate::features::points_to::domain::{InstanceKey, InstanceKeyId};
use crate::features::points_to::ports::{
    ContextInterpreter, ContextSelector, InstanceKeyFactory, ProgramView,
};
use crate::shared::models::{MethodRef, TypeRef};
use std::sync::Arc;

pub struct DelegatingContextSelector {
    primary: Arc<dyn ContextSelector>,
    secondary: Arc<dyn ContextSelector>,
}

impl DelegatingContextSelector {
    pub fn new(primary: Arc<dyn ContextSelector>, secondary: Arc<dyn ContextSelector>) -> Self {
        Self { primary, secondary }
    }

    pub fn select(&self, caller: &CallGraphNode) -> PolicySide {
        PolicySide::for_node(caller)
    }

    pub fn delegate(&self, side: PolicySide) -> &Arc<dyn ContextSelector> {
        match side {
            PolicySide::Primary => &self.primary,
            PolicySide::Secondary => &self.secondary,
        }
    }
}

impl ContextSelector for DelegatingContextSelector {
    fn describe(&self) -> String {
        format!(
            "delegating(primary={}, secondary={})",
            self.primary.describe(),
            self.secondary.describe()
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
        self.delegate(self.select(caller))
            .callee_context(caller, site, callee, receiver, program)
    }
}

pub struct DelegatingInstanceKeyFactory {
    primary: Arc<dyn InstanceKeyFactory>,
    secondary: Arc<dyn InstanceKeyFactory>,
}

impl DelegatingInstanceKeyFactory {
    pub fn new(
        primary: Arc<dyn InstanceKeyFactory>,
        secondary: Arc<dyn InstanceKeyFactory>,
    ) -> Self {
        Self { primary, secondary }
    }

    pub fn select(&self, node: &CallGraphNode) -> PolicySide {
        PolicySide::for_node(node)
    }

    pub fn delegate(&self, side: PolicySide) -> &Arc<dyn InstanceKeyFactory> {
        match side {
            PolicySide::Primary => &self.primary,
            PolicySide::Secondary => &self.secondary,
        }
    }
}

impl InstanceKeyFactory for DelegatingInstanceKeyFactory {
    fn describe(&self) -> String {
        format!(
            "delegating(primary={}, secondary={})",
            self.primary.describe(),
            self.secondary.describe()
        )
    }

    fn for_allocation(
        &self,
        node: &CallGraphNode,
        site: &NewSiteRef,
        program: &ProgramView<'_>,
    ) -> Option<InstanceKey> {
        self.delegate(self.select(node))
            .for_allocation(node, site, program)
    }

    fn for_pei(&self, node: &CallGraphNode, pc: u32, exception: &TypeRef) -> Option<InstanceKey> {
        self.delegate(self.select(node)).for_pei(node, pc, exception)
    }

    fn for_constant(&self, ty: &TypeRef) -> Option<InstanceKey> {
        self.primary.for_constant(ty)
    }

    fn for_metadata(&self, ty: &TypeRef) -> Option<InstanceKey> {
        self.primary.for_metadata(ty)
    }
}

pub struct DelegatingContextInterpreter {
    primary: Arc<dyn ContextInterpreter>,
    secondary: Arc<dyn ContextInterpreter>,
}

impl DelegatingContextInterpreter {
    pub fn new(
        primary: Arc<dyn ContextInterpreter>,
        secondary: Arc<dyn ContextInterpreter>,
    ) -> Self {
        Self { primary, secondary }
    }

    pub fn select(&self, node: &CallGraphNode) -> PolicySide {
        PolicySide::for_node(node)
    }

    pub fn delegate(&self, side: PolicySide) -> &Arc<dyn ContextInterpreter> {
        match side {
            PolicySide::Primary => &self.primary,
            PolicySide::Secondary => &self.secondary,
        }
    }
}

impl ContextInterpreter for DelegatingContextInterpreter {
    fn describe(&self) -> String {
        format!(
            "delegating(primary={}, secondary={})",
            self.primary.describe(),
            self.secondary.describe()
        )
    }

    fn understands(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> bool {
        self.delegate(self.select(node)).understands(node, program)
    }

    fn ir(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> Option<MethodBody> {
        self.delegate(self.select(node)).ir(node, program)
    }

    fn new_sites(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> Vec<NewSiteRef> {
        self.delegate(self.select(node)).new_sites(node, program)
    }

    fn call_sites(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> Vec<CallSiteRef> {
        self.delegate(self.select(node)).call_sites(node, program)
    }

    fn statement_count(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> usize {
        self.delegate(self.select(node))
            .statement_count(node, program)
    }
}
