use super::instance_keys::AllocationSiteInstanceKeys;
use super::interpreters::DefaultContextInterpreter;
use super::selectors::EverywhereContextSelector;
use crate::features::points_to::ports::{
    ContextInterpreter, ContextSelector, InstanceKeyFactory, NoSyntheticBodies, PropagationHooks,
    SyntheticBodies,
};
use std::sync::Arc;

/// Single-policy hooks without any call interception
pub struct BasicHooks {
    selector: Arc<dyn ContextSelector>,
    keys: Arc<dyn InstanceKeyFactory>,
    interpreter: Arc<dyn ContextInterpreter>,
}

impl BasicHooks {
    pub fn new(
        selector: Arc<dyn ContextSelector>,
        keys: Arc<dyn InstanceKeyFactory>,
        interpreter: Arc<dyn ContextInterpreter>,
    ) -> Self {
        Self {
            selector,
            keys,
            interpreter,
        }
    }
}

impl Default for BasicHooks {
    /// Context-insensitive, one object per (node, site)
    fn default() -> Self {
        Self::new(
            Arc::new(EverywhereContextSelector),
            Arc::new(AllocationSiteInstanceKeys),
            Arc::new(DefaultContextInterpreter),
        )
    }
}

impl PropagationHooks for BasicHooks {
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
