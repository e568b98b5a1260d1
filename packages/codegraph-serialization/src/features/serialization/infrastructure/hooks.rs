//! Engine hooks that redirect stream entry points to model nodes

use crate::features::callgraph::domain::{Context, NodeId, NodeKind};
use crate::features::delegation::DelegatingPolicies;
use crate::features::points_to::ports::{
    ContextInterpreter, ContextSelector, DispatchRequest, InstanceKeyFactory, PropagationHooks,
    SyntheticBodies,
};
use crate::features::serialization::domain::{
    DeserializationWork, SerializationWork, SerializationWorklists,
};
use crate::features::synthetic_model::StreamModels;
use crate::shared::models::names::{is_deserialization_entry, is_serialization_entry};
use tracing::debug;

/// Delegating policies plus the stream models and the pending worklists
pub struct SerializationHooks {
    policies: DelegatingPolicies,
    models: StreamModels,
    worklists: SerializationWorklists,
    substitutions: usize,
}

impl SerializationHooks {
    pub fn new(policies: DelegatingPolicies, models: StreamModels) -> Self {
        Self {
            policies,
            models,
            worklists: SerializationWorklists::new(),
            substitutions: 0,
        }
    }

    pub fn policies(&self) -> &DelegatingPolicies {
        &self.policies
    }

    pub fn models(&self) -> &StreamModels {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut StreamModels {
        &mut self.models
    }

    pub fn worklists(&self) -> &SerializationWorklists {
        &self.worklists
    }

    pub fn worklists_mut(&mut self) -> &mut SerializationWorklists {
        &mut self.worklists
    }

    /// Number of calls redirected so far (repeats included)
    pub fn substitutions(&self) -> usize {
        self.substitutions
    }
}

impl PropagationHooks for SerializationHooks {
    fn context_selector(&self) -> &dyn ContextSelector {
        self.policies.selector()
    }

    fn instance_keys(&self) -> &dyn InstanceKeyFactory {
        self.policies.keys()
    }

    fn interpreter(&self) -> &dyn ContextInterpreter {
        self.policies.interpreter()
    }

    fn synthetic_bodies(&self) -> &dyn SyntheticBodies {
        &self.models
    }

    /// Replace `readObject()`/`writeObject(Object)` called from application code
    ///
    /// The model node is keyed by (caller, pc), so the same call site always
    /// maps to the same node.
    fn intercept_call(&mut self, request: DispatchRequest<'_>) -> NodeId {
        let Some(resolved) = request.call_graph.node(request.resolved) else {
            return request.resolved;
        };
        let deserialization = is_deserialization_entry(&resolved.method);
        if !deserialization && !is_serialization_entry(&resolved.method) {
            return request.resolved;
        }
        let Some(caller) = request.call_graph.node(request.caller) else {
            return request.resolved;
        };
        let from_application = request
            .hierarchy
            .lookup(&caller.method.declaring_class)
            .is_some_and(|class| class.is_application());
        if !from_application {
            return request.resolved;
        }

        let model = if deserialization {
            self.models.deserialization_model()
        } else {
            self.models.serialization_model()
        };
        let context = Context::CallerSite {
            caller: request.caller,
            pc: request.invoke.site.pc,
        };
        let (target, created) = request
            .call_graph
            .find_or_create_node(model, context, NodeKind::Model);
        if created {
            debug!(
                "Model node {:?} replaces {} at {:?}@{}",
                target, request.invoke.site.target, request.caller, request.invoke.site.pc
            );
        }
        self.substitutions += 1;

        if deserialization {
            self.worklists.record_deserialization(DeserializationWork {
                caller: request.caller,
                invoke: request.invoke.clone(),
                target,
            });
        } else {
            self.worklists.record_serialization(SerializationWork {
                caller: request.caller,
                invoke: request.invoke.clone(),
                target,
            });
        }
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::callgraph::CallGraph;
    use crate::features::hierarchy::{ClassHierarchy, ClassInfo};
    use crate::features::ir::{Dispatch, Instruction, InstructionFactory, InvokeInstruction, MethodBody};
    use crate::features::points_to::infrastructure::IrCache;
    use crate::features::policy::Policy;
    use crate::shared::models::names::{read_object_entry_method, write_object_entry_method};
    use crate::shared::models::{MethodRef, Selector, TypeRef};

    struct Fixture {
        cha: ClassHierarchy,
        graph: CallGraph,
        cache: IrCache,
        hooks: SerializationHooks,
    }

    fn fixture() -> Fixture {
        let mut cha = ClassHierarchy::with_primordial_stubs();
        cha.add_class(ClassInfo::new("Lapp/Main"));
        let models = StreamModels::new(&cha).unwrap();
        let policies = DelegatingPolicies::build(Policy::zero_x(1), Policy::call_strings(1));
        Fixture {
            cha,
            graph: CallGraph::new(),
            cache: IrCache::default(),
            hooks: SerializationHooks::new(policies, models),
        }
    }

    fn call(target: MethodRef, pc: usize) -> InvokeInstruction {
        let def = (!target.selector.returns_void()).then_some(9);
        match InstructionFactory.invoke(pc, def, vec![1, 2], 10, target, Dispatch::Virtual) {
            Instruction::Invoke(invoke) => invoke,
            other => panic!("unexpected {:?}", other),
        }
    }

    fn intercept(f: &mut Fixture, caller_class: &str, invoke: &InvokeInstruction) -> (NodeId, NodeId) {
        let caller_method = MethodRef::new(TypeRef::new(caller_class), Selector::new("run", "()V"));
        let (caller, _) =
            f.graph
                .find_or_create_node(caller_method, Context::Everywhere, NodeKind::Ordinary);
        let (resolved, _) = f.graph.find_or_create_node(
            invoke.site.target.clone(),
            Context::Everywhere,
            NodeKind::Ordinary,
        );
        let body = MethodBody::new(1);
        let target = f.hooks.intercept_call(DispatchRequest {
            call_graph: &mut f.graph,
            ir_cache: &mut f.cache,
            hierarchy: &f.cha,
            caller,
            caller_body: &body,
            invoke,
            resolved,
        });
        (target, resolved)
    }

    #[test]
    fn test_application_write_object_is_replaced() {
        let mut f = fixture();
        let invoke = call(write_object_entry_method(), 3);
        let (target, resolved) = intercept(&mut f, "Lapp/Main", &invoke);

        assert_ne!(target, resolved);
        let node = f.graph.node(target).unwrap();
        assert!(node.is_model());
        assert_eq!(node.method, f.hooks.models().serialization_model());
        assert!(matches!(node.context, Context::CallerSite { pc: 3, .. }));
        assert_eq!(f.hooks.worklists().serialization_len(), 1);
        assert_eq!(f.hooks.worklists().deserialization_len(), 0);
    }

    #[test]
    fn test_substitution_is_memoized_per_call_site() {
        let mut f = fixture();
        let invoke = call(read_object_entry_method(), 5);
        let (first, _) = intercept(&mut f, "Lapp/Main", &invoke);
        let (second, _) = intercept(&mut f, "Lapp/Main", &invoke);
        assert_eq!(first, second);
        assert_eq!(f.graph.model_nodes().count(), 1);
        assert_eq!(f.hooks.worklists().deserialization_len(), 1);
        assert_eq!(f.hooks.substitutions(), 2);

        let other_site = call(read_object_entry_method(), 6);
        let (third, _) = intercept(&mut f, "Lapp/Main", &other_site);
        assert_ne!(first, third);
    }

    // ============================================================
    // EDGE CASES
    // ============================================================

    #[test]
    fn test_library_callers_keep_the_real_target() {
        let mut f = fixture();
        let invoke = call(write_object_entry_method(), 1);
        let (target, resolved) = intercept(&mut f, "Ljava/lang/String", &invoke);
        assert_eq!(target, resolved);
        assert!(f.hooks.worklists().is_empty());
    }

    #[test]
    fn test_other_calls_pass_through() {
        let mut f = fixture();
        let other = MethodRef::new(TypeRef::new("Lapp/Main"), Selector::new("helper", "()V"));
        let invoke = call(other, 2);
        let (target, resolved) = intercept(&mut f, "Lapp/Main", &invoke);
        assert_eq!(target, resolved);
        assert_eq!(f.hooks.substitutions(), 0);
    }
}
