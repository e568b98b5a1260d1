//! Fixed-point run results

use crate::features::callgraph::CallGraph;
use crate::features::points_to::domain::PointerKey;
use crate::features::points_to::infrastructure::EngineStats;
use std::collections::BTreeSet;

/// Statistics of one driver run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Propagate/instrument rounds executed
    pub rounds: usize,

    /// Engine work items added by instrumentation, summed over all rounds
    pub worklist_delta: usize,

    /// Model nodes fed back into the engine, summed over all rounds
    pub changed_nodes: usize,

    /// The configured round limit stopped the loop before the fixed point
    pub hit_round_limit: bool,
}

/// Completed call graph plus the pointers touched by the stream models
#[derive(Debug)]
pub struct CallGraphResult {
    pub call_graph: CallGraph,

    /// Pointers written by modeled deserialization
    pub deserialized: BTreeSet<PointerKey>,

    /// Pointers read by modeled serialization
    pub serialized: BTreeSet<PointerKey>,

    pub stats: DriverStats,
    pub engine_stats: EngineStats,

    /// Delegation layout used for the run
    pub policies: String,
}

impl CallGraphResult {
    /// Whether any stream call was replaced by a model node
    pub fn has_model_nodes(&self) -> bool {
        self.call_graph.model_nodes().next().is_some()
    }
}
