use super::instruction::{Instruction, InvokeInstruction, NewSiteRef, ValueId};
use rustc_hash::FxHashMap;

/// Instructions of one method (or one context of a synthetic method)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodBody {
    pub instructions: Vec<Instruction>,

    /// Integer constants keyed by the value number holding them
    pub constants: FxHashMap<ValueId, i64>,

    /// Parameter count including `this`
    pub parameter_count: usize,
}

impl MethodBody {
    pub fn new(parameter_count: usize) -> Self {
        Self {
            parameter_count,
            ..Self::default()
        }
    }

    /// Builder: append an instruction
    pub fn with(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Builder: bind an integer constant
    pub fn with_constant(mut self, value: ValueId, constant: i64) -> Self {
        self.constants.insert(value, constant);
        self
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Calls at a given call-site pc
    pub fn calls_at(&self, pc: u32) -> Vec<&InvokeInstruction> {
        self.instructions
            .iter()
            .filter_map(Instruction::as_invoke)
            .filter(|invoke| invoke.site.pc == pc)
            .collect()
    }

    pub fn calls(&self) -> impl Iterator<Item = &InvokeInstruction> {
        self.instructions.iter().filter_map(Instruction::as_invoke)
    }

    pub fn new_sites(&self) -> impl Iterator<Item = &NewSiteRef> {
        self.instructions.iter().filter_map(Instruction::as_new_site)
    }

    /// Instructions reading `value`
    pub fn users_of(&self, value: ValueId) -> impl Iterator<Item = &Instruction> {
        self.instructions
            .iter()
            .filter(move |inst| inst.uses().contains(&value))
    }

    /// Highest value number defined or used
    pub fn max_value_number(&self) -> ValueId {
        let from_instructions = self
            .instructions
            .iter()
            .flat_map(|inst| inst.def().into_iter().chain(inst.uses()))
            .max()
            .unwrap_or(0);
        let from_constants = self.constants.keys().copied().max().unwrap_or(0);
        from_instructions
            .max(from_constants)
            .max(self.parameter_count as ValueId)
    }
}
