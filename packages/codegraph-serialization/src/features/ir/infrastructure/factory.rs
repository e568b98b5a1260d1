//! Instruction factory
//!
//! Builds instructions from explicit local slots and an instruction index.
//! Slot allocation is the caller's job.

use crate::features::ir::domain::{
    CallSiteRef, Dispatch, Instruction, InvokeInstruction, NewSiteRef, ValueId,
};
use crate::shared::models::{FieldRef, MethodRef, TypeRef};

#[derive(Debug, Clone, Copy, Default)]
pub struct InstructionFactory;

impl InstructionFactory {
    pub fn new_object(&self, iindex: usize, def: ValueId, site: NewSiteRef) -> Instruction {
        Instruction::New {
            iindex,
            def,
            site,
            dimensions: Vec::new(),
        }
    }

    pub fn new_array(
        &self,
        iindex: usize,
        def: ValueId,
        site: NewSiteRef,
        dimensions: Vec<ValueId>,
    ) -> Instruction {
        Instruction::New {
            iindex,
            def,
            site,
            dimensions,
        }
    }

    pub fn array_store(
        &self,
        iindex: usize,
        array: ValueId,
        index: ValueId,
        value: ValueId,
        element_type: TypeRef,
    ) -> Instruction {
        Instruction::ArrayStore {
            iindex,
            array,
            index,
            value,
            element_type,
        }
    }

    pub fn get_field(
        &self,
        iindex: usize,
        def: ValueId,
        object: ValueId,
        field: FieldRef,
    ) -> Instruction {
        Instruction::GetField {
            iindex,
            def,
            object,
            field,
        }
    }

    pub fn put_field(
        &self,
        iindex: usize,
        object: ValueId,
        value: ValueId,
        field: FieldRef,
    ) -> Instruction {
        Instruction::PutField {
            iindex,
            object,
            value,
            field,
        }
    }

    pub fn check_cast(
        &self,
        iindex: usize,
        def: ValueId,
        value: ValueId,
        types: Vec<TypeRef>,
    ) -> Instruction {
        Instruction::CheckCast {
            iindex,
            def,
            value,
            types,
        }
    }

    /// Call with or without a result; `pc` of the site equals `iindex`
    pub fn invoke(
        &self,
        iindex: usize,
        def: Option<ValueId>,
        params: Vec<ValueId>,
        exception: ValueId,
        target: MethodRef,
        dispatch: Dispatch,
    ) -> Instruction {
        Instruction::Invoke(InvokeInstruction {
            iindex,
            def,
            exception,
            params,
            site: CallSiteRef::new(iindex as u32, target, dispatch),
        })
    }

    pub fn phi(&self, iindex: usize, def: ValueId, values: Vec<ValueId>) -> Instruction {
        Instruction::Phi {
            iindex,
            def,
            values,
        }
    }

    pub fn return_value(&self, iindex: usize, value: Option<ValueId>) -> Instruction {
        Instruction::Return { iindex, value }
    }

    pub fn assign(&self, iindex: usize, def: ValueId, value: ValueId) -> Instruction {
        Instruction::Assign { iindex, def, value }
    }
}
