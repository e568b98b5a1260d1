//! Ports (Interfaces) for the propagation engine
//!
//! Every precision-sensitive decision the engine makes goes through one of
//! these traits:
//! - **ContextSelector**: calling context for a callee
//! - **InstanceKeyFactory**: abstract object for an allocation
//! - **ContextInterpreter**: instructions of a node
//!
//! `PropagationHooks` bundles the three with a dispatch interception point,
//! and `SyntheticBodies` exposes fabricated method bodies to interpreters.

use crate::features::callgraph::domain::{CallGraphNode, Context, NodeId};
use crate::features::callgraph::CallGraph;
use crate::features::hierarchy::ClassHierarchy;
use crate::features::ir::{CallSiteRef, InvokeInstruction, MethodBody, NewSiteRef};
use crate::features::points_to::domain::{InstanceKey, InstanceKeyId};
use crate::features::points_to::infrastructure::IrCache;
use crate::shared::models::{MethodRef, TypeRef};

/// Read-only view of the program handed to policy objects
#[derive(Clone, Copy)]
pub struct ProgramView<'a> {
    pub hierarchy: &'a ClassHierarchy,
    pub synthetic: &'a dyn SyntheticBodies,
}

/// Source of fabricated per-context method bodies
pub trait SyntheticBodies {
    /// Whether `method` is a synthetic method
    fn defines(&self, method: &MethodRef) -> bool;

    /// Current body of `method` in `context`
    fn body(&self, method: &MethodRef, context: &Context) -> Option<MethodBody>;
}

/// No synthetic methods at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSyntheticBodies;

impl SyntheticBodies for NoSyntheticBodies {
    fn defines(&self, _method: &MethodRef) -> bool {
        false
    }

    fn body(&self, _method: &MethodRef, _context: &Context) -> Option<MethodBody> {
        None
    }
}

/// Chooses the calling context of a callee
pub trait ContextSelector {
    /// Identity used in diagnostics and routing checks
    fn describe(&self) -> String;

    /// Context for `callee` called from `caller` at `site`; None means no opinion
    fn callee_context(
        &self,
        caller: &CallGraphNode,
        site: &CallSiteRef,
        callee: &MethodRef,
        receiver: Option<(InstanceKeyId, &InstanceKey)>,
        program: &ProgramView<'_>,
    ) -> Option<Context>;
}

/// Chooses abstract objects
pub trait InstanceKeyFactory {
    fn describe(&self) -> String;

    fn for_allocation(
        &self,
        node: &CallGraphNode,
        site: &NewSiteRef,
        program: &ProgramView<'_>,
    ) -> Option<InstanceKey>;

    /// Exception object thrown by a PEI
    fn for_pei(&self, node: &CallGraphNode, pc: u32, exception: &TypeRef) -> Option<InstanceKey>;

    fn for_constant(&self, ty: &TypeRef) -> Option<InstanceKey> {
        Some(InstanceKey::Constant {
            concrete_type: ty.clone(),
        })
    }

    fn for_metadata(&self, ty: &TypeRef) -> Option<InstanceKey> {
        Some(InstanceKey::Metadata {
            concrete_type: ty.clone(),
        })
    }
}

/// Answers structural queries about a node's instructions
pub trait ContextInterpreter {
    fn describe(&self) -> String;

    fn understands(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> bool;

    fn ir(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> Option<MethodBody>;

    fn new_sites(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> Vec<NewSiteRef> {
        self.ir(node, program)
            .map(|body| body.new_sites().cloned().collect())
            .unwrap_or_default()
    }

    fn call_sites(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> Vec<CallSiteRef> {
        self.ir(node, program)
            .map(|body| body.calls().map(|c| c.site.clone()).collect())
            .unwrap_or_default()
    }

    fn statement_count(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> usize {
        self.ir(node, program).map_or(0, |body| body.len())
    }
}

/// A freshly bound call, offered to the hooks before the edge is added
pub struct DispatchRequest<'a> {
    pub call_graph: &'a mut CallGraph,
    pub ir_cache: &'a mut IrCache,
    pub hierarchy: &'a ClassHierarchy,
    pub caller: NodeId,
    pub caller_body: &'a MethodBody,
    pub invoke: &'a InvokeInstruction,
    /// Node the engine resolved the call to
    pub resolved: NodeId,
}

/// Policy bundle consulted by the engine
pub trait PropagationHooks {
    fn context_selector(&self) -> &dyn ContextSelector;

    fn instance_keys(&self) -> &dyn InstanceKeyFactory;

    fn interpreter(&self) -> &dyn ContextInterpreter;

    fn synthetic_bodies(&self) -> &dyn SyntheticBodies;

    /// Replace the resolved target of a call; identity by default
    fn intercept_call(&mut self, request: DispatchRequest<'_>) -> NodeId {
        request.resolved
    }
}

/// Cooperative progress and cancellation
pub trait ProgressMonitor {
    fn begin_task(&mut self, name: &str, total_units: usize);

    fn sub_task(&mut self, name: &str);

    fn worked(&mut self, units: usize);

    fn done(&mut self);

    fn cancel(&mut self);

    fn is_canceled(&self) -> bool;
}
