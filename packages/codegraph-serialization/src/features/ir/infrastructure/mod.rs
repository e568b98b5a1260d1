pub mod factory;

pub use factory::InstructionFactory;
