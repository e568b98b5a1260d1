//! Test data builders

use codegraph_serialization::features::ir::ValueId;
use codegraph_serialization::features::points_to::infrastructure::NullMonitor;
use codegraph_serialization::features::serialization::HandlerRound;
use codegraph_serialization::{
    AnalysisConfig, ClassHierarchy, Dispatch, DriverStats, FieldRef, FixedPointDriver,
    Instruction, InstructionFactory, MethodBody, MethodInfo, MethodRef, NewSiteRef, NodeId,
    PropagationEngine, SerializationHandler, SerializationHooks, StreamModels, TypeRef,
    TypeResolver,
};
use codegraph_serialization::{DelegationBuilder, ProgressMonitor};

/// Method body builder; instruction indices (and call-site pcs) are assigned in order
#[derive(Debug)]
pub struct BodyBuilder {
    body: MethodBody,
    factory: InstructionFactory,
}

impl BodyBuilder {
    pub fn new(parameter_count: usize) -> Self {
        Self {
            body: MethodBody::new(parameter_count),
            factory: InstructionFactory,
        }
    }

    fn next(&self) -> usize {
        self.body.len()
    }

    fn push(mut self, instruction: Instruction) -> Self {
        self.body = self.body.with(instruction);
        self
    }

    /// `def = new ty`
    pub fn new_object(self, def: ValueId, ty: &str) -> Self {
        let index = self.next();
        let instruction =
            self.factory
                .new_object(index, def, NewSiteRef::new(index as u32, TypeRef::new(ty)));
        self.push(instruction)
    }

    /// `object.field = value`
    pub fn put_field(self, object: ValueId, field: FieldRef, value: ValueId) -> Self {
        let index = self.next();
        let instruction = self.factory.put_field(index, object, value, field);
        self.push(instruction)
    }

    /// `def = (ty) value`
    pub fn cast(self, def: ValueId, value: ValueId, ty: &str) -> Self {
        let index = self.next();
        let instruction = self
            .factory
            .check_cast(index, def, value, vec![TypeRef::new(ty)]);
        self.push(instruction)
    }

    /// Virtual call without a result; `params[0]` is the receiver
    pub fn call(self, target: MethodRef, params: Vec<ValueId>, exception: ValueId) -> Self {
        self.call_with(Dispatch::Virtual, target, params, exception)
    }

    pub fn call_static(self, target: MethodRef, params: Vec<ValueId>, exception: ValueId) -> Self {
        self.call_with(Dispatch::Static, target, params, exception)
    }

    fn call_with(
        self,
        dispatch: Dispatch,
        target: MethodRef,
        params: Vec<ValueId>,
        exception: ValueId,
    ) -> Self {
        let index = self.next();
        let instruction = self
            .factory
            .invoke(index, None, params, exception, target, dispatch);
        self.push(instruction)
    }

    /// `def = receiver.target(..)`
    pub fn call_with_result(
        self,
        def: ValueId,
        target: MethodRef,
        params: Vec<ValueId>,
        exception: ValueId,
    ) -> Self {
        let index = self.next();
        let instruction =
            self.factory
                .invoke(index, Some(def), params, exception, target, Dispatch::Virtual);
        self.push(instruction)
    }

    pub fn return_void(self) -> Self {
        let index = self.next();
        let instruction = self.factory.return_value(index, None);
        self.push(instruction)
    }

    pub fn build(self) -> MethodBody {
        self.body
    }
}

/// Method of `owner` whose body only returns
pub fn empty_method(owner: &str, selector: codegraph_serialization::Selector) -> MethodInfo {
    let parameters = selector
        .parse()
        .map(|d| d.params.len() + 1)
        .unwrap_or(1);
    MethodInfo::new(&TypeRef::new(owner), selector)
        .with_body(BodyBuilder::new(parameters).return_void().build())
}

/// Engine, hooks, handler and driver of one run, wired like
/// `SerializationCallGraphBuilder` but left open for inspection
pub struct AnalysisHarness {
    pub engine: PropagationEngine,
    pub hooks: SerializationHooks,
    pub handler: SerializationHandler,
    pub driver: FixedPointDriver,
}

impl AnalysisHarness {
    pub fn new(config: AnalysisConfig, hierarchy: ClassHierarchy, entrypoints: &[MethodRef]) -> Self {
        let policies = DelegationBuilder::new(config.primary, config.secondary)
            .interpreters(None)
            .instance_keys()
            .context_selectors(None);
        let models = StreamModels::new(&hierarchy).expect("stream models");
        let resolver = TypeResolver::new(&hierarchy, config.pruning);
        let mut engine = PropagationEngine::new(hierarchy);
        for method in entrypoints {
            engine.add_entrypoint(method).expect("entry point");
        }
        Self {
            engine,
            hooks: SerializationHooks::new(policies, models),
            handler: SerializationHandler::new(resolver),
            driver: FixedPointDriver::new(config.max_rounds),
        }
    }

    /// Full driver run
    pub fn run(&mut self) -> DriverStats {
        self.run_with(&mut NullMonitor::new())
            .expect("driver run")
    }

    pub fn run_with(
        &mut self,
        monitor: &mut dyn ProgressMonitor,
    ) -> codegraph_serialization::Result<DriverStats> {
        self.driver
            .run(&mut self.engine, &mut self.hooks, &mut self.handler, monitor)
    }

    /// One propagate/instrument round, driven by hand
    pub fn step(&mut self) -> HandlerRound {
        let mut monitor = NullMonitor::new();
        self.engine
            .solve(&mut self.hooks, &mut monitor)
            .expect("solve");
        let round = self
            .handler
            .handle(&mut self.engine, &mut self.hooks, &mut monitor)
            .expect("handle");
        for node in &round.changed {
            self.engine.add_constraints_from_changed_node(*node);
        }
        round
    }

    /// Model nodes standing in for `model`, in id order
    pub fn model_nodes(&self, model: &MethodRef) -> Vec<NodeId> {
        self.engine
            .call_graph()
            .model_nodes()
            .filter(|n| &n.method == model)
            .map(|n| n.id)
            .collect()
    }

    pub fn serialization_nodes(&self) -> Vec<NodeId> {
        self.model_nodes(&self.hooks.models().serialization_model())
    }

    pub fn deserialization_nodes(&self) -> Vec<NodeId> {
        self.model_nodes(&self.hooks.models().deserialization_model())
    }

    /// Current synthetic body of a model node
    pub fn model_body(&self, node: NodeId) -> Vec<Instruction> {
        let node = self.engine.call_graph().node(node).expect("model node");
        self.hooks
            .models()
            .method(&node.method)
            .map(|m| m.body(&node.context).instructions)
            .unwrap_or_default()
    }

    pub fn statement_count(&self, node: NodeId) -> usize {
        self.model_body(node).len()
    }
}
