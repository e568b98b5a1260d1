//! End-to-end entry point: configuration + class universe + entry points → call graph

use super::driver::FixedPointDriver;
use crate::config::AnalysisConfig;
use crate::errors::Result;
use crate::features::delegation::{DelegatingPolicies, DelegationBuilder};
use crate::features::fixpoint::domain::{CallGraphResult, DriverStats};
use crate::features::hierarchy::ClassHierarchy;
use crate::features::points_to::infrastructure::PropagationEngine;
use crate::features::points_to::ports::{ContextInterpreter, ContextSelector, ProgressMonitor};
use crate::features::serialization::{SerializationHandler, SerializationHooks};
use crate::features::synthetic_model::StreamModels;
use crate::features::type_resolution::TypeResolver;
use crate::shared::models::MethodRef;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Builder for one serialization-aware call-graph run
///
/// # Example
/// ```no_run
/// use codegraph_serialization::{AnalysisConfig, ClassHierarchy, NullMonitor, SerializationCallGraphBuilder};
///
/// let hierarchy = ClassHierarchy::with_primordial_stubs();
/// let result = SerializationCallGraphBuilder::new(AnalysisConfig::default(), hierarchy)
///     .build(&mut NullMonitor::new())?;
/// println!("{} nodes", result.call_graph.len());
/// # Ok::<(), codegraph_serialization::SerializationError>(())
/// ```
pub struct SerializationCallGraphBuilder {
    config: AnalysisConfig,
    hierarchy: ClassHierarchy,
    entrypoints: Vec<MethodRef>,
    app_interpreter: Option<Arc<dyn ContextInterpreter>>,
    app_selector: Option<Arc<dyn ContextSelector>>,
}

impl SerializationCallGraphBuilder {
    pub fn new(config: AnalysisConfig, hierarchy: ClassHierarchy) -> Self {
        Self {
            config,
            hierarchy,
            entrypoints: Vec::new(),
            app_interpreter: None,
            app_selector: None,
        }
    }

    pub fn with_entrypoint(mut self, method: MethodRef) -> Self {
        self.entrypoints.push(method);
        self
    }

    pub fn with_entrypoints(mut self, methods: impl IntoIterator<Item = MethodRef>) -> Self {
        self.entrypoints.extend(methods);
        self
    }

    /// Interpreter consulted before the default one for ordinary nodes
    pub fn with_app_interpreter(mut self, interpreter: Arc<dyn ContextInterpreter>) -> Self {
        self.app_interpreter = Some(interpreter);
        self
    }

    /// Selector consulted before the primary policy's one for ordinary nodes
    pub fn with_app_selector(mut self, selector: Arc<dyn ContextSelector>) -> Self {
        self.app_selector = Some(selector);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn policies(&self) -> DelegatingPolicies {
        DelegationBuilder::new(self.config.primary, self.config.secondary)
            .interpreters(self.app_interpreter.clone())
            .instance_keys()
            .context_selectors(self.app_selector.clone())
    }

    fn engine(&self) -> Result<PropagationEngine> {
        let mut engine = PropagationEngine::new(self.hierarchy.clone());
        for method in &self.entrypoints {
            engine.add_entrypoint(method)?;
        }
        Ok(engine)
    }

    /// Call graph with stream calls modeled
    pub fn build(self, monitor: &mut dyn ProgressMonitor) -> Result<CallGraphResult> {
        self.config.validate()?;
        let policies = self.policies();
        let description = policies.describe();
        let models = StreamModels::new(&self.hierarchy)?;
        let resolver = TypeResolver::new(&self.hierarchy, self.config.pruning);
        info!(
            "Building call graph from {} entry points ({}; {} serializable classes)",
            self.entrypoints.len(),
            self.config.describe(),
            resolver.serializable_classes().len()
        );

        let mut engine = self.engine()?;
        let mut hooks = SerializationHooks::new(policies, models);
        let mut handler = SerializationHandler::new(resolver);
        let stats = FixedPointDriver::new(self.config.max_rounds).run(
            &mut engine,
            &mut hooks,
            &mut handler,
            monitor,
        )?;

        let engine_stats = engine.stats().clone();
        let (deserialized, serialized) = handler.into_results();
        Ok(CallGraphResult {
            call_graph: engine.into_call_graph(),
            deserialized,
            serialized,
            stats,
            engine_stats,
            policies: description,
        })
    }

    /// Call graph without stream modeling, for comparison
    pub fn build_baseline(self, monitor: &mut dyn ProgressMonitor) -> Result<CallGraphResult> {
        self.config.validate()?;
        let mut policies = self.policies();
        let description = policies.describe();
        let mut engine = self.engine()?;

        monitor.begin_task("baseline call graph", 1);
        engine.solve(&mut policies, monitor)?;
        monitor.done();

        let engine_stats = engine.stats().clone();
        Ok(CallGraphResult {
            call_graph: engine.into_call_graph(),
            deserialized: BTreeSet::new(),
            serialized: BTreeSet::new(),
            stats: DriverStats {
                rounds: 1,
                ..DriverStats::default()
            },
            engine_stats,
            policies: description,
        })
    }
}
