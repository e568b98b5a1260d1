use crate::features::callgraph::domain::Context;
use crate::features::ir::MethodBody;
use crate::shared::models::MethodRef;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Method bodies keyed by (method, context)
#[derive(Debug, Default)]
pub struct IrCache {
    entries: FxHashMap<(MethodRef, Context), Arc<MethodBody>>,
    invalidations: usize,
}

impl IrCache {
    pub fn get(&self, method: &MethodRef, context: &Context) -> Option<Arc<MethodBody>> {
        self.entries
            .get(&(method.clone(), context.clone()))
            .cloned()
    }

    pub fn insert(&mut self, method: MethodRef, context: Context, body: MethodBody) -> Arc<MethodBody> {
        let body = Arc::new(body);
        self.entries.insert((method, context), Arc::clone(&body));
        body
    }

    /// Drop the cached body; returns whether one was present
    pub fn invalidate(&mut self, method: &MethodRef, context: &Context) -> bool {
        self.invalidations += 1;
        self.entries
            .remove(&(method.clone(), context.clone()))
            .is_some()
    }

    pub fn invalidation_count(&self) -> usize {
        self.invalidations
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
