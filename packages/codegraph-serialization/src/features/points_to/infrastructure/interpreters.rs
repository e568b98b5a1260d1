//! Context interpreters over real method bodies

use crate::features::callgraph::domain::CallGraphNode;
use crate::features::ir::MethodBody;
use crate::features::points_to::ports::{ContextInterpreter, ProgramView};
use std::sync::Arc;

/// Bodies straight from the class hierarchy; context is ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultContextInterpreter;

impl ContextInterpreter for DefaultContextInterpreter {
    fn describe(&self) -> String {
        "default".to_string()
    }

    fn understands(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> bool {
        program
            .hierarchy
            .method(&node.method)
            .is_some_and(|m| m.body.is_some())
    }

    fn ir(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> Option<MethodBody> {
        program.hierarchy.method(&node.method)?.body.clone()
    }
}

/// Asks `first` for every node it understands, `fallback` otherwise
pub struct FallbackContextInterpreter {
    first: Arc<dyn ContextInterpreter>,
    fallback: Arc<dyn ContextInterpreter>,
}

impl FallbackContextInterpreter {
    pub fn new(first: Arc<dyn ContextInterpreter>, fallback: Arc<dyn ContextInterpreter>) -> Self {
        Self { first, fallback }
    }

    fn pick(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> &dyn ContextInterpreter {
        if self.first.understands(node, program) {
            self.first.as_ref()
        } else {
            self.fallback.as_ref()
        }
    }
}

impl ContextInterpreter for FallbackContextInterpreter {
    fn describe(&self) -> String {
        format!("{} | {}", self.first.describe(), self.fallback.describe())
    }

    fn understands(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> bool {
        self.first.understands(node, program) || self.fallback.understands(node, program)
    }

    fn ir(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> Option<MethodBody> {
        self.pick(node, program).ir(node, program)
    }
}
