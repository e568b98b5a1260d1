//! Forward data-dependence slicer
//!
//! Follows def-use chains from one value across the current call graph:
//! arguments into callee parameters, returns back into caller results,
//! and field stores into every load of the same field (field-based heap).
//! Control dependences are not tracked. Only bodies already in the IR cache
//! are inspected, so the slice reflects what the solver has visited.

use super::engine::PropagationEngine;
use crate::features::callgraph::domain::NodeId;
use crate::features::ir::{Instruction, ValueId};
use crate::shared::models::FieldRef;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, VecDeque};

/// Slice criterion: a value of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceSeed {
    pub node: NodeId,
    pub value: ValueId,
}

/// Statement reached by the slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceStatement {
    pub node: NodeId,
    pub instruction: Instruction,
}

pub struct DataDependenceSlicer<'a> {
    engine: &'a PropagationEngine,
}

impl<'a> DataDependenceSlicer<'a> {
    pub fn new(engine: &'a PropagationEngine) -> Self {
        Self { engine }
    }

    /// Statements that (transitively) read `seed`, ordered by (node, iindex)
    pub fn forward_slice(&self, seed: SliceSeed) -> Vec<SliceStatement> {
        let mut visited: FxHashSet<(NodeId, ValueId)> = FxHashSet::default();
        let mut tainted_fields: FxHashSet<FieldRef> = FxHashSet::default();
        let mut statements: BTreeMap<(NodeId, usize), Instruction> = BTreeMap::new();
        let mut queue = VecDeque::from([(seed.node, seed.value)]);

        while let Some((node, value)) = queue.pop_front() {
            if !visited.insert((node, value)) {
                continue;
            }
            let Some(body) = self.engine.ir_for(node) else {
                continue;
            };
            for inst in body.users_of(value) {
                statements
                    .entry((node, inst.iindex()))
                    .or_insert_with(|| inst.clone());
                if let Some(def) = inst.def() {
                    queue.push_back((node, def));
                }
                match inst {
                    Instruction::Invoke(invoke) => {
                        let graph = self.engine.call_graph();
                        for callee in graph.targets_at(node, invoke.site.pc) {
                            for (position, arg) in invoke.params.iter().enumerate() {
                                if *arg == value {
                                    queue.push_back((callee, position as ValueId + 1));
                                }
                            }
                        }
                    }
                    Instruction::Return { .. } => {
                        for (caller, pc) in self.engine.call_graph().callers(node) {
                            let Some(caller_body) = self.engine.ir_for(caller) else {
                                continue;
                            };
                            for call in caller_body.calls_at(pc) {
                                if let Some(def) = call.def {
                                    queue.push_back((caller, def));
                                }
                            }
                        }
                    }
                    Instruction::PutField {
                        value: stored,
                        field,
                        ..
                    } if *stored == value => {
                        if tainted_fields.insert(field.clone()) {
                            self.loads_of(field, &mut statements, &mut queue);
                        }
                    }
                    Instruction::ArrayStore {
                        array,
                        value: stored,
                        ..
                    } if *stored == value => {
                        queue.push_back((node, *array));
                    }
                    _ => {}
                }
            }
        }

        statements
            .into_iter()
            .map(|((node, _), instruction)| SliceStatement { node, instruction })
            .collect()
    }

    fn loads_of(
        &self,
        field: &FieldRef,
        statements: &mut BTreeMap<(NodeId, usize), Instruction>,
        queue: &mut VecDeque<(NodeId, ValueId)>,
    ) {
        for node in self.engine.call_graph().nodes() {
            let Some(body) = self.engine.ir_for(node.id) else {
                continue;
            };
            for inst in &body.instructions {
                if let Instruction::GetField { def, field: read, .. } = inst {
                    if read == field {
                        statements
                            .entry((node.id, inst.iindex()))
                            .or_insert_with(|| inst.clone());
                        queue.push_back((node.id, *def));
                    }
                }
            }
        }
    }
}
