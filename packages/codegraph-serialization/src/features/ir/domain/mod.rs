//! Domain models for the instruction set

pub mod instruction;
pub mod method_body;

pub use instruction::{
    CallSiteRef, Dispatch, Instruction, InvokeInstruction, NewSiteRef, ValueId,
};
pub use method_body::MethodBody;
