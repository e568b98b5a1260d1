//! Staged construction of the delegating facades
//!
//! The instance-key factories count allocation sites through the
//! interpreters, and the container selector asks the ZeroX factory whether a
//! receiver is a real allocation. The builder therefore only exposes the next
//! legal step:
//!
//! ```text
//! DelegationBuilder<NeedsInterpreters>
//!     .interpreters(..)      -> DelegationBuilder<NeedsInstanceKeys>
//!     .instance_keys()       -> DelegationBuilder<NeedsContextSelectors>
//!     .context_selectors(..) -> DelegatingPolicies
//! ```

use super::facades::{
    DelegatingContextInterpreter, DelegatingContextSelector, DelegatingInstanceKeyFactory,
};
use crate::features::callgraph::domain::CallGraphNode;
use crate::features::delegation::domain::PolicySide;
use crate::features::points_to::infrastructure::{
    AllocationSiteInstanceKeys, CallStringContextSelector, ClassBasedInstanceKeys,
    ContainerContextSelector, DefaultContextInterpreter, EverywhereContextSelector,
    FallbackContextInterpreter, FallbackContextSelector, ZeroXInstanceKeys,
};
use crate::features::points_to::ports::{
    ContextInterpreter, ContextSelector, InstanceKeyFactory, NoSyntheticBodies, PropagationHooks,
    SyntheticBodies,
};
use crate::features::policy::{Policy, PolicyKind};
use crate::features::synthetic_model::ModelContextInterpreter;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Stages
// ============================================================================

pub struct NeedsInterpreters;

pub struct NeedsInstanceKeys {
    interpreters: Arc<DelegatingContextInterpreter>,
    primary_interpreter: Arc<dyn ContextInterpreter>,
    secondary_interpreter: Arc<dyn ContextInterpreter>,
}

pub struct NeedsContextSelectors {
    interpreters: Arc<DelegatingContextInterpreter>,
    keys: Arc<DelegatingInstanceKeyFactory>,
    primary_zero_x: Option<Arc<ZeroXInstanceKeys>>,
    secondary_zero_x: Option<Arc<ZeroXInstanceKeys>>,
}

/// Builder for the primary/secondary policy pair
pub struct DelegationBuilder<S> {
    primary: Policy,
    secondary: Policy,
    stage: S,
}

impl DelegationBuilder<NeedsInterpreters> {
    pub fn new(primary: Policy, secondary: Policy) -> Self {
        Self {
            primary,
            secondary,
            stage: NeedsInterpreters,
        }
    }

    /// Install the interpreter facade
    ///
    /// The primary side reads real bodies, preceded by `app` when given.
    /// The secondary side always reads synthetic model bodies.
    pub fn interpreters(
        self,
        app: Option<Arc<dyn ContextInterpreter>>,
    ) -> DelegationBuilder<NeedsInstanceKeys> {
        let default: Arc<dyn ContextInterpreter> = Arc::new(DefaultContextInterpreter);
        let primary: Arc<dyn ContextInterpreter> = match app {
            Some(app) => Arc::new(FallbackContextInterpreter::new(app, default)),
            None => default,
        };
        let secondary: Arc<dyn ContextInterpreter> = Arc::new(ModelContextInterpreter);
        let interpreters = Arc::new(DelegatingContextInterpreter::new(
            primary.clone(),
            secondary.clone(),
        ));

        DelegationBuilder {
            primary: self.primary,
            secondary: self.secondary,
            stage: NeedsInstanceKeys {
                interpreters,
                primary_interpreter: primary,
                secondary_interpreter: secondary,
            },
        }
    }
}

impl DelegationBuilder<NeedsInstanceKeys> {
    /// Install the instance-key facade on top of the interpreters
    pub fn instance_keys(self) -> DelegationBuilder<NeedsContextSelectors> {
        let (primary, primary_zero_x) = keys_for(
            self.primary,
            PolicySide::Primary,
            &self.stage.primary_interpreter,
        );
        let (secondary, secondary_zero_x) = keys_for(
            self.secondary,
            PolicySide::Secondary,
            &self.stage.secondary_interpreter,
        );

        DelegationBuilder {
            primary: self.primary,
            secondary: self.secondary,
            stage: NeedsContextSelectors {
                interpreters: self.stage.interpreters,
                keys: Arc::new(DelegatingInstanceKeyFactory::new(primary, secondary)),
                primary_zero_x,
                secondary_zero_x,
            },
        }
    }
}

impl DelegationBuilder<NeedsContextSelectors> {
    /// Install the context-selector facade and finish
    ///
    /// An application selector, when given, takes precedence on the primary
    /// side only.
    pub fn context_selectors(self, app: Option<Arc<dyn ContextSelector>>) -> DelegatingPolicies {
        let primary_default = selector_for(self.primary, self.stage.primary_zero_x);
        let primary: Arc<dyn ContextSelector> = match app {
            Some(app) => Arc::new(FallbackContextSelector::new(app, primary_default)),
            None => primary_default,
        };
        let secondary = selector_for(self.secondary, self.stage.secondary_zero_x);

        let policies = DelegatingPolicies {
            selector: Arc::new(DelegatingContextSelector::new(primary, secondary)),
            keys: self.stage.keys,
            interpreter: self.stage.interpreters,
            primary: self.primary,
            secondary: self.secondary,
        };
        debug!(
            "Delegation built: primary={} secondary={}",
            policies.primary, policies.secondary
        );
        policies
    }
}

fn keys_for(
    policy: Policy,
    side: PolicySide,
    interpreter: &Arc<dyn ContextInterpreter>,
) -> (Arc<dyn InstanceKeyFactory>, Option<Arc<ZeroXInstanceKeys>>) {
    if policy.uses_zero_x_objects() {
        let zero_x = Arc::new(ZeroXInstanceKeys::new(policy.bound(), interpreter.clone()));
        return (zero_x.clone(), Some(zero_x));
    }
    let keys: Arc<dyn InstanceKeyFactory> = match side {
        PolicySide::Primary => Arc::new(AllocationSiteInstanceKeys),
        PolicySide::Secondary => Arc::new(ClassBasedInstanceKeys),
    };
    (keys, None)
}

fn selector_for(policy: Policy, zero_x: Option<Arc<ZeroXInstanceKeys>>) -> Arc<dyn ContextSelector> {
    let everywhere: Arc<dyn ContextSelector> = Arc::new(EverywhereContextSelector);
    match (policy.kind(), zero_x) {
        (PolicyKind::BoundedCallStrings, _) => {
            Arc::new(CallStringContextSelector::new(policy.bound() as usize))
        }
        (PolicyKind::ZeroXContainerSensitive, Some(keys)) => {
            Arc::new(ContainerContextSelector::new(keys, everywhere))
        }
        _ => everywhere,
    }
}

// ============================================================================
// Result
// ============================================================================

/// The three facades plus the policies they were built from
#[derive(Clone)]
pub struct DelegatingPolicies {
    selector: Arc<DelegatingContextSelector>,
    keys: Arc<DelegatingInstanceKeyFactory>,
    interpreter: Arc<DelegatingContextInterpreter>,
    primary: Policy,
    secondary: Policy,
}

impl DelegatingPolicies {
    /// Shorthand for the full builder chain without application hooks
    pub fn build(primary: Policy, secondary: Policy) -> Self {
        DelegationBuilder::new(primary, secondary)
            .interpreters(None)
            .instance_keys()
            .context_selectors(None)
    }

    pub fn primary(&self) -> Policy {
        self.primary
    }

    pub fn secondary(&self) -> Policy {
        self.secondary
    }

    pub fn selector(&self) -> &DelegatingContextSelector {
        &self.selector
    }

    pub fn keys(&self) -> &DelegatingInstanceKeyFactory {
        &self.keys
    }

    pub fn interpreter(&self) -> &DelegatingContextInterpreter {
        &self.interpreter
    }

    /// `primary=.. secondary=..` followed by the facade layout
    pub fn describe(&self) -> String {
        format!(
            "primary={} secondary={}: selector={} keys={} interpreter={}",
            self.primary,
            self.secondary,
            self.selector.describe(),
            self.keys.describe(),
            self.interpreter.describe()
        )
    }

    /// Side every facade picks for `node`
    pub fn side_for(&self, node: &CallGraphNode) -> PolicySide {
        PolicySide::for_node(node)
    }
}

/// Baseline hooks: delegation without stream models or interception
impl PropagationHooks for DelegatingPolicies {
    fn context_selector(&self) -> &dyn ContextSelector {
        self.selector.as_ref()
    }

    fn instance_keys(&self) -> &dyn InstanceKeyFactory {
        self.keys.as_ref()
    }

    fn interpreter(&self) -> &dyn ContextInterpreter {
        self.interpreter.as_ref()
    }

    fn synthetic_bodies(&self) -> &dyn SyntheticBodies {
        &NoSyntheticBodies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::callgraph::domain::{Context, NodeId, NodeKind};
    use crate::features::hierarchy::ClassHierarchy;
    use crate::features::ir::{CallSiteRef, Dispatch, NewSiteRef};
    use crate::features::points_to::domain::InstanceKey;
    use crate::features::points_to::ports::ProgramView;
    use crate::shared::models::{MethodRef, Selector, TypeRef};

    fn node(kind: NodeKind) -> CallGraphNode {
        CallGraphNode {
            id: NodeId(7),
            method: MethodRef::new(TypeRef::new("Lapp/A"), Selector::new("run", "()V")),
            context: Context::Everywhere,
            kind,
        }
    }

    fn policies() -> DelegatingPolicies {
        DelegatingPolicies::build(Policy::zero_x_container(1), Policy::call_strings(1))
    }

    #[test]
    fn test_all_facades_route_ordinary_nodes_to_primary() {
        let p = policies();
        let ordinary = node(NodeKind::Ordinary);
        assert_eq!(p.side_for(&ordinary), PolicySide::Primary);

        let side = p.selector().select(&ordinary);
        assert_eq!(side, PolicySide::Primary);
        assert!(p.selector().delegate(side).describe().starts_with("container"));
        let side = p.keys().select(&ordinary);
        assert!(p.keys().delegate(side).describe().starts_with("zero-x(1"));
        let side = p.interpreter().select(&ordinary);
        assert_eq!(p.interpreter().delegate(side).describe(), "default");
    }

    #[test]
    fn test_all_facades_route_model_nodes_to_secondary() {
        let p = policies();
        let model = node(NodeKind::Model);
        assert_eq!(p.side_for(&model), PolicySide::Secondary);

        let side = p.selector().select(&model);
        assert_eq!(p.selector().delegate(side).describe(), "call-string(1)");
        let side = p.keys().select(&model);
        assert_eq!(p.keys().delegate(side).describe(), "class-based");
        let side = p.interpreter().select(&model);
        assert_eq!(p.interpreter().delegate(side).describe(), "model");
    }

    #[test]
    fn test_allocation_keys_follow_the_node() {
        let p = policies();
        let cha = ClassHierarchy::with_primordial_stubs();
        let program = ProgramView {
            hierarchy: &cha,
            synthetic: &NoSyntheticBodies,
        };
        let site = NewSiteRef::new(0, TypeRef::new("Ljava/lang/String"));

        let model_key = p
            .keys()
            .for_allocation(&node(NodeKind::Model), &site, &program)
            .unwrap();
        assert!(matches!(model_key, InstanceKey::ClassBased { .. }));

        let pei = p
            .keys()
            .for_pei(&node(NodeKind::Model), 3, &TypeRef::new("Ljava/lang/ClassCastException"))
            .unwrap();
        assert!(matches!(pei, InstanceKey::ClassBased { .. }));
    }

    #[test]
    fn test_call_string_contexts_only_for_model_callers() {
        let p = policies();
        let cha = ClassHierarchy::with_primordial_stubs();
        let program = ProgramView {
            hierarchy: &cha,
            synthetic: &NoSyntheticBodies,
        };
        let callee = MethodRef::new(TypeRef::new("Lapp/B"), Selector::new("go", "()V"));
        let site = CallSiteRef::new(4, callee.clone(), Dispatch::Static);

        let from_model = p
            .selector()
            .callee_context(&node(NodeKind::Model), &site, &callee, None, &program)
            .unwrap();
        assert_eq!(from_model.depth(), 1);

        let from_ordinary = p
            .selector()
            .callee_context(&node(NodeKind::Ordinary), &site, &callee, None, &program)
            .unwrap();
        assert_eq!(from_ordinary, Context::Everywhere);
    }

    #[test]
    fn test_application_hooks_only_affect_primary() {
        let app: Arc<dyn ContextSelector> = Arc::new(CallStringContextSelector::new(2));
        let p = DelegationBuilder::new(Policy::zero_x(1), Policy::zero_x(1))
            .interpreters(Some(Arc::new(DefaultContextInterpreter)))
            .instance_keys()
            .context_selectors(Some(app));

        let primary = p.selector().delegate(PolicySide::Primary).describe();
        assert_eq!(primary, "call-string(2) | everywhere");
        let secondary = p.selector().delegate(PolicySide::Secondary).describe();
        assert_eq!(secondary, "everywhere");
        assert_eq!(
            p.interpreter().delegate(PolicySide::Primary).describe(),
            "default | default"
        );
    }

    // ============================================================
    // EDGE CASES
    // ============================================================

    #[test]
    fn test_constants_and_metadata_always_use_primary() {
        let p = DelegatingPolicies::build(Policy::call_strings(1), Policy::call_strings(1));
        let ty = TypeRef::new("Ljava/lang/String");
        assert!(matches!(
            p.keys().for_constant(&ty),
            Some(InstanceKey::Constant { .. })
        ));
        assert!(matches!(
            p.keys().for_metadata(&ty),
            Some(InstanceKey::Metadata { .. })
        ));
    }

    #[test]
    fn test_k_cfa_primary_uses_allocation_sites() {
        let p = DelegatingPolicies::build(Policy::call_strings(2), Policy::zero_x(0));
        assert_eq!(
            p.keys().delegate(PolicySide::Primary).describe(),
            "allocation-in-node"
        );
        assert_eq!(
            p.keys().delegate(PolicySide::Secondary).describe(),
            "zero-x(0, via model)"
        );
        assert!(p.describe().contains("call-string(2)"));
    }
}
