//! Driver loop and end-to-end builder

pub mod call_graph_builder;
pub mod driver;

pub use call_graph_builder::SerializationCallGraphBuilder;
pub use driver::FixedPointDriver;
