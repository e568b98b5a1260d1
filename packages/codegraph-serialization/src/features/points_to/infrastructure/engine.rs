//! Propagation engine
//!
//! Inclusion-based (Andersen) constraints over `PointerKey`s with an
//! on-the-fly call graph:
//! - ALLOC:  v = new T      → pts(v) ⊇ {key(site)}
//! - COPY:   v = w          → pts(v) ⊇ pts(w), optionally filtered by a cast
//! - LOAD:   v = w.f        → ∀o ∈ pts(w): pts(v) ⊇ pts(o.f)
//! - STORE:  w.f = v        → ∀o ∈ pts(w): pts(o.f) ⊇ pts(v)
//! - CALL:   virtual calls dispatch once per receiver object
//!
//! Work items are node visits and pointer propagations, drained FIFO.
//! Re-visiting a node only processes instructions appended since its last
//! visit, so bodies are expected to be append-only.

use crate::errors::{Result, SerializationError};
use crate::features::callgraph::domain::{CallGraphNode, Context, NodeId, NodeKind};
use crate::features::callgraph::CallGraph;
use crate::features::hierarchy::ClassHierarchy;
use crate::features::ir::{Instruction, InvokeInstruction, MethodBody, NewSiteRef, ValueId};
use crate::features::points_to::domain::{
    CreationSite, InstanceKey, InstanceKeyId, InstanceKeyTable, PointerKey,
};
use crate::features::points_to::infrastructure::IrCache;
use crate::features::points_to::ports::{
    DispatchRequest, ProgramView, ProgressMonitor, PropagationHooks,
};
use crate::shared::models::names::CLASS_CAST_EXCEPTION;
use crate::shared::models::{FieldRef, MethodRef, TypeRef};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Work items processed between two cancellation polls
const CANCEL_POLL_INTERVAL: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CopyEdge {
    to: PointerKey,
    /// Cast filter: only objects assignable to one of these types pass
    filter: Option<Vec<TypeRef>>,
}

/// Constraint that fires for every object reaching its source pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Dependent {
    Load { field: FieldRef, to: PointerKey },
    Store { field: FieldRef, from: PointerKey },
    ArrayLoad { to: PointerKey },
    ArrayStore { from: PointerKey },
    Dispatch { caller: NodeId, invoke: InvokeInstruction },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum WorkItem {
    Visit(NodeId),
    Propagate(PointerKey),
}

/// Engine statistics
#[derive(Debug, Default, Clone)]
pub struct EngineStats {
    pub nodes_visited: usize,
    pub work_items: usize,
    pub copy_edges: usize,
    pub dispatches: usize,
}

pub struct PropagationEngine {
    hierarchy: ClassHierarchy,
    call_graph: CallGraph,
    keys: InstanceKeyTable,
    points_to: FxHashMap<PointerKey, BTreeSet<InstanceKeyId>>,
    copy_edges: FxHashMap<PointerKey, Vec<CopyEdge>>,
    copy_edge_set: FxHashSet<(PointerKey, CopyEdge)>,
    dependents: FxHashMap<PointerKey, Vec<Dependent>>,
    dependent_set: FxHashSet<(PointerKey, Dependent)>,
    creation_sites: FxHashMap<InstanceKeyId, BTreeSet<CreationSite>>,
    ir_cache: IrCache,
    /// Instructions already turned into constraints, per node
    processed: FxHashMap<NodeId, usize>,
    worklist: VecDeque<WorkItem>,
    queued: FxHashSet<WorkItem>,
    bound_calls: FxHashSet<(NodeId, usize, NodeId, Option<InstanceKeyId>)>,
    stats: EngineStats,
}

impl PropagationEngine {
    pub fn new(hierarchy: ClassHierarchy) -> Self {
        Self {
            hierarchy,
            call_graph: CallGraph::new(),
            keys: InstanceKeyTable::default(),
            points_to: FxHashMap::default(),
            copy_edges: FxHashMap::default(),
            copy_edge_set: FxHashSet::default(),
            dependents: FxHashMap::default(),
            dependent_set: FxHashSet::default(),
            creation_sites: FxHashMap::default(),
            ir_cache: IrCache::default(),
            processed: FxHashMap::default(),
            worklist: VecDeque::new(),
            queued: FxHashSet::default(),
            bound_calls: FxHashSet::default(),
            stats: EngineStats::default(),
        }
    }

    pub fn hierarchy(&self) -> &ClassHierarchy {
        &self.hierarchy
    }

    pub fn call_graph(&self) -> &CallGraph {
        &self.call_graph
    }

    pub fn into_call_graph(self) -> CallGraph {
        self.call_graph
    }

    pub fn instance_keys(&self) -> &InstanceKeyTable {
        &self.keys
    }

    pub fn ir_cache(&self) -> &IrCache {
        &self.ir_cache
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    fn program<'a>(&'a self, hooks: &'a dyn PropagationHooks) -> ProgramView<'a> {
        ProgramView {
            hierarchy: &self.hierarchy,
            synthetic: hooks.synthetic_bodies(),
        }
    }

    // ========================================================================
    // Solver interface
    // ========================================================================

    /// Register an entry point; reference-typed parameters receive placeholder objects
    pub fn add_entrypoint(&mut self, method: &MethodRef) -> Result<NodeId> {
        let is_static = self
            .hierarchy
            .method(method)
            .ok_or_else(|| SerializationError::UnknownMethod(method.to_string()))?
            .is_static;
        let params = method.selector.parse()?.params;

        let (node, _) = self.call_graph.find_or_create_node(
            method.clone(),
            Context::Everywhere,
            NodeKind::Ordinary,
        );
        self.call_graph.add_entrypoint(node);

        let mut value: ValueId = 1;
        if !is_static {
            self.add_concrete_type_fact(
                PointerKey::local(node, value),
                method.declaring_class.clone(),
            );
            value += 1;
        }
        for param in params {
            if !param.is_primitive() {
                self.add_concrete_type_fact(PointerKey::local(node, value), param);
            }
            value += 1;
        }

        self.enqueue(WorkItem::Visit(node));
        Ok(node)
    }

    /// Run until the worklist is empty
    pub fn solve(
        &mut self,
        hooks: &mut dyn PropagationHooks,
        monitor: &mut dyn ProgressMonitor,
    ) -> Result<()> {
        if monitor.is_canceled() {
            return Err(SerializationError::Cancelled);
        }
        let mut steps = 0usize;
        while let Some(item) = self.worklist.pop_front() {
            self.queued.remove(&item);
            steps += 1;
            self.stats.work_items += 1;
            if steps % CANCEL_POLL_INTERVAL == 0 {
                monitor.worked(CANCEL_POLL_INTERVAL);
                if monitor.is_canceled() {
                    return Err(SerializationError::Cancelled);
                }
            }
            match item {
                WorkItem::Visit(node) => self.visit_node(node, hooks)?,
                WorkItem::Propagate(pointer) => self.propagate(&pointer, hooks)?,
            }
        }
        Ok(())
    }

    /// Number of pending work items
    pub fn pending_work(&self) -> usize {
        self.worklist.len()
    }

    pub fn is_worklist_empty(&self) -> bool {
        self.worklist.is_empty()
    }

    /// Current points-to set, in key order
    pub fn points_to(&self, pointer: &PointerKey) -> Vec<InstanceKeyId> {
        self.points_to
            .get(pointer)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn instance_key(&self, id: InstanceKeyId) -> Option<&InstanceKey> {
        self.keys.get(id)
    }

    /// Allocation sites of an abstract object; None for placeholder objects
    pub fn creation_sites(&self, id: InstanceKeyId) -> Option<Vec<CreationSite>> {
        let key = self.keys.get(id)?;
        if key.is_placeholder() {
            return None;
        }
        Some(
            self.creation_sites
                .get(&id)
                .map(|sites| sites.iter().cloned().collect())
                .unwrap_or_default(),
        )
    }

    /// Abstract object the current policy assigns to `site` in `node`
    pub fn instance_key_for_allocation(
        &mut self,
        node: NodeId,
        site: &NewSiteRef,
        hooks: &dyn PropagationHooks,
    ) -> Option<InstanceKeyId> {
        let node = self.call_graph.node(node)?.clone();
        self.allocate(&node, site, hooks)
    }

    /// Assert that `pointer` may hold an object of exactly `ty`
    pub fn add_concrete_type_fact(&mut self, pointer: PointerKey, ty: TypeRef) -> InstanceKeyId {
        let key = self.keys.intern(InstanceKey::ConcreteType { concrete_type: ty });
        self.add_points_to(pointer, [key]);
        key
    }

    /// Drop the cached body of (method, context)
    pub fn invalidate(&mut self, method: &MethodRef, context: &Context) -> bool {
        self.ir_cache.invalidate(method, context)
    }

    /// Schedule a re-visit of a node whose body grew
    pub fn add_constraints_from_changed_node(&mut self, node: NodeId) {
        self.enqueue(WorkItem::Visit(node));
    }

    /// Cached body of a visited node
    pub fn ir_for(&self, node: NodeId) -> Option<Arc<MethodBody>> {
        let node = self.call_graph.node(node)?;
        self.ir_cache.get(&node.method, &node.context)
    }

    // ========================================================================
    // Node visiting
    // ========================================================================

    fn enqueue(&mut self, item: WorkItem) {
        if self.queued.insert(item.clone()) {
            self.worklist.push_back(item);
        }
    }

    fn body_for(
        &mut self,
        node: &CallGraphNode,
        hooks: &dyn PropagationHooks,
    ) -> Option<Arc<MethodBody>> {
        if let Some(body) = self.ir_cache.get(&node.method, &node.context) {
            return Some(body);
        }
        let body = {
            let program = self.program(hooks);
            hooks.interpreter().ir(node, &program)
        }?;
        Some(
            self.ir_cache
                .insert(node.method.clone(), node.context.clone(), body),
        )
    }

    fn visit_node(&mut self, id: NodeId, hooks: &mut dyn PropagationHooks) -> Result<()> {
        let node = self
            .call_graph
            .node(id)
            .cloned()
            .ok_or(SerializationError::UnknownNode(id))?;
        let start = self.processed.get(&id).copied().unwrap_or(0);
        let Some(body) = self.body_for(&node, &*hooks) else {
            self.processed.entry(id).or_insert(0);
            return Ok(());
        };
        self.processed.insert(id, body.instructions.len().max(start));
        if start >= body.instructions.len() {
            return Ok(());
        }

        self.stats.nodes_visited += 1;
        for inst in body.instructions.iter().skip(start) {
            self.process_instruction(&node, inst, hooks)?;
        }
        Ok(())
    }

    fn process_instruction(
        &mut self,
        node: &CallGraphNode,
        inst: &Instruction,
        hooks: &mut dyn PropagationHooks,
    ) -> Result<()> {
        let local = |value: ValueId| PointerKey::local(node.id, value);
        match inst {
            Instruction::New { def, site, .. } => {
                if let Some(key) = self.allocate(node, site, &*hooks) {
                    self.add_points_to(local(*def), [key]);
                }
            }
            Instruction::ArrayStore { array, value, .. } => {
                self.add_dependent(
                    local(*array),
                    Dependent::ArrayStore {
                        from: local(*value),
                    },
                    hooks,
                )?;
            }
            Instruction::ArrayLoad { def, array, .. } => {
                self.add_dependent(
                    local(*array),
                    Dependent::ArrayLoad { to: local(*def) },
                    hooks,
                )?;
            }
            Instruction::GetField {
                def, object, field, ..
            } => {
                self.add_dependent(
                    local(*object),
                    Dependent::Load {
                        field: field.clone(),
                        to: local(*def),
                    },
                    hooks,
                )?;
            }
            Instruction::PutField {
                object,
                value,
                field,
                ..
            } => {
                self.add_dependent(
                    local(*object),
                    Dependent::Store {
                        field: field.clone(),
                        from: local(*value),
                    },
                    hooks,
                )?;
            }
            Instruction::CheckCast {
                iindex,
                def,
                value,
                types,
            } => {
                self.add_copy_edge(local(*value), local(*def), Some(types.clone()));
                let exception = TypeRef::new(CLASS_CAST_EXCEPTION);
                if let Some(kind) = hooks
                    .instance_keys()
                    .for_pei(node, *iindex as u32, &exception)
                {
                    let key = self.keys.intern(kind);
                    self.add_points_to(PointerKey::ExceptionalReturn { node: node.id }, [key]);
                }
            }
            Instruction::Phi { def, values, .. } => {
                for value in values {
                    self.add_copy_edge(local(*value), local(*def), None);
                }
            }
            Instruction::Assign { def, value, .. } => {
                self.add_copy_edge(local(*value), local(*def), None);
            }
            Instruction::Return {
                value: Some(value), ..
            } => {
                self.add_copy_edge(
                    local(*value),
                    PointerKey::ReturnValue { node: node.id },
                    None,
                );
            }
            Instruction::Return { value: None, .. } => {}
            Instruction::Invoke(invoke) => self.process_invoke(node, invoke, hooks)?,
        }
        Ok(())
    }

    fn process_invoke(
        &mut self,
        node: &CallGraphNode,
        invoke: &InvokeInstruction,
        hooks: &mut dyn PropagationHooks,
    ) -> Result<()> {
        if invoke.site.dispatch.is_dispatched() {
            let Some(receiver) = invoke.receiver() else {
                return Ok(());
            };
            return self.add_dependent(
                PointerKey::local(node.id, receiver),
                Dependent::Dispatch {
                    caller: node.id,
                    invoke: invoke.clone(),
                },
                hooks,
            );
        }

        let target = &invoke.site.target;
        let resolved = self
            .hierarchy
            .resolve_method(&target.declaring_class, &target.selector)
            .map(|m| m.reference.clone());
        match resolved {
            Some(method) => self.bind_call(node.id, invoke, method, None, hooks),
            None => {
                debug!("Unresolved {} call in {}", invoke.site, node);
                Ok(())
            }
        }
    }

    fn allocate(
        &mut self,
        node: &CallGraphNode,
        site: &NewSiteRef,
        hooks: &dyn PropagationHooks,
    ) -> Option<InstanceKeyId> {
        let kind = {
            let program = self.program(hooks);
            hooks.instance_keys().for_allocation(node, site, &program)
        }?;
        let key = self.keys.intern(kind);
        self.creation_sites
            .entry(key)
            .or_default()
            .insert(CreationSite {
                node: node.id,
                site: site.clone(),
            });
        Some(key)
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn dispatch(
        &mut self,
        caller: NodeId,
        invoke: &InvokeInstruction,
        receiver: InstanceKeyId,
        hooks: &mut dyn PropagationHooks,
    ) -> Result<()> {
        let Some(receiver_type) = self.keys.get(receiver).map(|k| k.concrete_type().clone())
        else {
            return Ok(());
        };
        let declared = &invoke.site.target;
        if !self
            .hierarchy
            .is_assignable_from(&declared.declaring_class, &receiver_type)
        {
            return Ok(());
        }
        let target = match self
            .hierarchy
            .resolve_method(&receiver_type, &declared.selector)
        {
            Some(method) if !method.is_abstract => method.reference.clone(),
            _ => {
                debug!(
                    "No implementation of {} for receiver {}",
                    declared.selector, receiver_type
                );
                return Ok(());
            }
        };
        self.stats.dispatches += 1;
        self.bind_call(caller, invoke, target, Some(receiver), hooks)
    }

    fn bind_call(
        &mut self,
        caller_id: NodeId,
        invoke: &InvokeInstruction,
        target: MethodRef,
        receiver: Option<InstanceKeyId>,
        hooks: &mut dyn PropagationHooks,
    ) -> Result<()> {
        let caller = self
            .call_graph
            .node(caller_id)
            .cloned()
            .ok_or(SerializationError::UnknownNode(caller_id))?;

        let context = {
            let program = self.program(&*hooks);
            let receiver_key = receiver.and_then(|r| self.keys.get(r).map(|k| (r, k)));
            hooks.context_selector().callee_context(
                &caller,
                &invoke.site,
                &target,
                receiver_key,
                &program,
            )
        }
        .unwrap_or(Context::Everywhere);

        let (resolved, _) =
            self.call_graph
                .find_or_create_node(target, context, NodeKind::Ordinary);
        let caller_body = self
            .ir_cache
            .get(&caller.method, &caller.context)
            .unwrap_or_default();
        let callee = hooks.intercept_call(DispatchRequest {
            call_graph: &mut self.call_graph,
            ir_cache: &mut self.ir_cache,
            hierarchy: &self.hierarchy,
            caller: caller_id,
            caller_body: &caller_body,
            invoke,
            resolved,
        });

        if !self
            .bound_calls
            .insert((caller_id, invoke.iindex, callee, receiver))
        {
            return Ok(());
        }
        self.call_graph.add_edge(caller_id, invoke.site.pc, callee);
        if !self.processed.contains_key(&callee) {
            self.enqueue(WorkItem::Visit(callee));
        }

        for (position, arg) in invoke.params.iter().enumerate() {
            let formal = PointerKey::local(callee, position as ValueId + 1);
            match receiver {
                Some(key) if position == 0 => {
                    self.add_points_to(formal, [key]);
                }
                _ => self.add_copy_edge(PointerKey::local(caller_id, *arg), formal, None),
            }
        }
        if let Some(def) = invoke.def {
            self.add_copy_edge(
                PointerKey::ReturnValue { node: callee },
                PointerKey::local(caller_id, def),
                None,
            );
        }
        self.add_copy_edge(
            PointerKey::ExceptionalReturn { node: callee },
            PointerKey::local(caller_id, invoke.exception),
            None,
        );
        Ok(())
    }

    // ========================================================================
    // Constraints
    // ========================================================================

    fn add_points_to(
        &mut self,
        pointer: PointerKey,
        keys: impl IntoIterator<Item = InstanceKeyId>,
    ) -> bool {
        let set = self.points_to.entry(pointer.clone()).or_default();
        let before = set.len();
        set.extend(keys);
        let grew = set.len() > before;
        if grew {
            self.enqueue(WorkItem::Propagate(pointer));
        }
        grew
    }

    fn add_copy_edge(&mut self, from: PointerKey, to: PointerKey, filter: Option<Vec<TypeRef>>) {
        let edge = CopyEdge { to, filter };
        if !self.copy_edge_set.insert((from.clone(), edge.clone())) {
            return;
        }
        self.stats.copy_edges += 1;
        self.copy_edges
            .entry(from.clone())
            .or_default()
            .push(edge.clone());
        let current = self.points_to(&from);
        self.transfer(&current, &edge);
    }

    fn transfer(&mut self, keys: &[InstanceKeyId], edge: &CopyEdge) {
        let passed: Vec<InstanceKeyId> = match &edge.filter {
            None => keys.to_vec(),
            Some(types) => keys
                .iter()
                .copied()
                .filter(|k| self.passes_filter(*k, types))
                .collect(),
        };
        if !passed.is_empty() {
            self.add_points_to(edge.to.clone(), passed);
        }
    }

    fn passes_filter(&self, key: InstanceKeyId, types: &[TypeRef]) -> bool {
        self.keys.get(key).is_some_and(|k| {
            types
                .iter()
                .any(|t| self.hierarchy.is_assignable_from(t, k.concrete_type()))
        })
    }

    fn add_dependent(
        &mut self,
        source: PointerKey,
        dependent: Dependent,
        hooks: &mut dyn PropagationHooks,
    ) -> Result<()> {
        if !self
            .dependent_set
            .insert((source.clone(), dependent.clone()))
        {
            return Ok(());
        }
        self.dependents
            .entry(source.clone())
            .or_default()
            .push(dependent.clone());
        let current = self.points_to(&source);
        if current.is_empty() {
            return Ok(());
        }
        self.apply_dependent(&current, &dependent, hooks)
    }

    fn apply_dependent(
        &mut self,
        keys: &[InstanceKeyId],
        dependent: &Dependent,
        hooks: &mut dyn PropagationHooks,
    ) -> Result<()> {
        match dependent {
            Dependent::Load { field, to } => {
                for &object in keys {
                    self.add_copy_edge(PointerKey::field(object, field.clone()), to.clone(), None);
                }
            }
            Dependent::Store { field, from } => {
                for &object in keys {
                    self.add_copy_edge(from.clone(), PointerKey::field(object, field.clone()), None);
                }
            }
            Dependent::ArrayLoad { to } => {
                for &object in keys {
                    self.add_copy_edge(
                        PointerKey::ArrayContents { instance: object },
                        to.clone(),
                        None,
                    );
                }
            }
            Dependent::ArrayStore { from } => {
                for &object in keys {
                    self.add_copy_edge(
                        from.clone(),
                        PointerKey::ArrayContents { instance: object },
                        None,
                    );
                }
            }
            Dependent::Dispatch { caller, invoke } => {
                for &receiver in keys {
                    self.dispatch(*caller, invoke, receiver, hooks)?;
                }
            }
        }
        Ok(())
    }

    fn propagate(&mut self, pointer: &PointerKey, hooks: &mut dyn PropagationHooks) -> Result<()> {
        let current = self.points_to(pointer);
        if let Some(edges) = self.copy_edges.get(pointer).cloned() {
            for edge in &edges {
                self.transfer(&current, edge);
            }
        }
        if let Some(dependents) = self.dependents.get(pointer).cloned() {
            for dependent in &dependents {
                self.apply_dependent(&current, dependent, hooks)?;
            }
        }
        Ok(())
    }
}
