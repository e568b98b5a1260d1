pub mod call_graph;

pub use call_graph::CallGraph;
