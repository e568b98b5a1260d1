//! Host instruction set
//!
//! - `domain`: instructions, call/allocation sites, method bodies
//! - `infrastructure`: instruction factory

pub mod domain;
pub mod infrastructure;

pub use domain::{
    CallSiteRef, Dispatch, Instruction, InvokeInstruction, MethodBody, NewSiteRef, ValueId,
};
pub use infrastructure::InstructionFactory;
