use crate::features::callgraph::domain::CallGraphNode;
use crate::features::ir::MethodBody;
use crate::features::points_to::ports::{ContextInterpreter, ProgramView};

/// Interprets synthetic model nodes from the current per-context body
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelContextInterpreter;

impl ContextInterpreter for ModelContextInterpreter {
    fn describe(&self) -> String {
        "model".to_string()
    }

    fn understands(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> bool {
        program.synthetic.defines(&node.method)
    }

    fn ir(&self, node: &CallGraphNode, program: &ProgramView<'_>) -> Option<MethodBody> {
        program.synthetic.body(&node.method, &node.context)
    }
}
