//! Custom assertions for call graphs and model bodies

use codegraph_serialization::{CallGraph, Instruction, MethodRef};

/// Names of the methods invoked by `body`, in instruction order
pub fn invoked(body: &[Instruction]) -> Vec<String> {
    body.iter()
        .filter_map(Instruction::as_invoke)
        .map(|invoke| invoke.site.target.selector.name().to_string())
        .collect()
}

/// Number of calls to a method named `name`
pub fn count_invocations(body: &[Instruction], name: &str) -> usize {
    invoked(body).iter().filter(|n| n.as_str() == name).count()
}

/// Types of all casts in `body`, in instruction order
pub fn cast_types(body: &[Instruction]) -> Vec<String> {
    body.iter()
        .filter_map(Instruction::cast_types)
        .flatten()
        .map(|t| t.as_str().to_string())
        .collect()
}

/// Assert that `first` is called, and called before any call to `second`
pub fn assert_called_before(body: &[Instruction], first: &str, second: &str) {
    let names = invoked(body);
    let a = names.iter().position(|n| n == first);
    let b = names.iter().position(|n| n == second);
    match (a, b) {
        (Some(a), Some(b)) => assert!(a < b, "Expected {first} before {second}, got {names:?}"),
        _ => panic!("Expected both {first} and {second} to be called, got {names:?}"),
    }
}

/// Assert that some node of the call graph runs `method`
pub fn assert_reachable(graph: &CallGraph, method: &MethodRef) {
    assert!(
        graph.nodes_for_method(method).next().is_some(),
        "Expected {method} in the call graph, nodes: {:?}",
        graph.nodes().map(|n| n.method.to_string()).collect::<Vec<_>>()
    );
}

/// Assert that no node of the call graph runs `method`
pub fn assert_unreachable(graph: &CallGraph, method: &MethodRef) {
    assert!(
        graph.nodes_for_method(method).next().is_none(),
        "Expected {method} to be absent from the call graph"
    );
}
