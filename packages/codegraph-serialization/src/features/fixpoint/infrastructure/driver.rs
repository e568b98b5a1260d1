//! Propagate/instrument loop
//!
//! Each round runs the engine's solver to exhaustion, then one handler
//! round, then feeds the changed model nodes back into the engine. The loop
//! ends once a round leaves the engine worklist empty and the
//! instrumentation added no work to it.

use crate::errors::{Result, SerializationError};
use crate::features::fixpoint::domain::DriverStats;
use crate::features::points_to::infrastructure::PropagationEngine;
use crate::features::points_to::ports::ProgressMonitor;
use crate::features::serialization::{SerializationHandler, SerializationHooks};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPointDriver {
    max_rounds: Option<usize>,
}

impl FixedPointDriver {
    pub fn new(max_rounds: Option<usize>) -> Self {
        Self { max_rounds }
    }

    pub fn max_rounds(&self) -> Option<usize> {
        self.max_rounds
    }

    /// Run to the joint fixed point of the engine and the handler
    ///
    /// Cancellation from the engine or the handler aborts the run; no
    /// partial statistics are returned.
    pub fn run(
        &self,
        engine: &mut PropagationEngine,
        hooks: &mut SerializationHooks,
        handler: &mut SerializationHandler,
        monitor: &mut dyn ProgressMonitor,
    ) -> Result<DriverStats> {
        let mut stats = DriverStats::default();
        monitor.begin_task("serialization-aware call graph", self.max_rounds.unwrap_or(0));

        loop {
            if monitor.is_canceled() {
                return Err(SerializationError::Cancelled);
            }
            stats.rounds += 1;
            monitor.sub_task(&format!("round {}", stats.rounds));

            // Propagate
            engine.solve(hooks, monitor)?;

            // Instrument
            let before = engine.pending_work();
            let round = handler.handle(engine, hooks, monitor)?;
            for node in &round.changed {
                engine.add_constraints_from_changed_node(*node);
            }
            let delta = engine.pending_work().saturating_sub(before);
            stats.worklist_delta += delta;
            stats.changed_nodes += round.changed.len();
            monitor.worked(1);

            debug!(
                "Round {}: {} serialization, {} deserialization entries, {} changed, worklist +{}",
                stats.rounds,
                round.serialization_entries,
                round.deserialization_entries,
                round.changed.len(),
                delta
            );

            if delta == 0 && engine.is_worklist_empty() {
                break;
            }
            if self.max_rounds.is_some_and(|max| stats.rounds >= max) {
                warn!(
                    "Stopping after {} rounds with {} pending work items",
                    stats.rounds,
                    engine.pending_work()
                );
                stats.hit_round_limit = true;
                break;
            }
        }

        monitor.done();
        info!(
            "Fixed point after {} rounds: worklist delta {}, {} changed nodes, {} call graph nodes",
            stats.rounds,
            stats.worklist_delta,
            stats.changed_nodes,
            engine.call_graph().len()
        );
        Ok(stats)
    }
}
