//! Dispatch strategies offered to client analyses

mod common;

use codegraph_serialization::features::type_resolution::{
    DefaultDispatcher, SerializationDispatcher, UnsoundSerializationDispatcher,
};
use codegraph_serialization::shared::models::names::read_object_callback;
use codegraph_serialization::{
    AnalysisConfig, CallGraphNode, Dispatch, Dispatcher, Instruction, InstructionFactory,
    PruningConfig, TypeResolver,
};
use common::*;
use pretty_assertions::assert_eq;

/// `animal.readObject(in)` issued from `Main.run`
fn animal_call() -> Instruction {
    InstructionFactory.invoke(
        0,
        None,
        vec![3, 1],
        4,
        method_of(ANIMAL, read_object_callback()),
        Dispatch::Interface,
    )
}

fn entry_node(library_animals: usize) -> (AnalysisHarness, CallGraphNode) {
    let harness = AnalysisHarness::new(
        AnalysisConfig::default(),
        zoo_program(library_animals),
        &[main_run(RUN_READ)],
    );
    let graph = harness.engine.call_graph();
    let node = graph
        .node(graph.entrypoints()[0])
        .cloned()
        .expect("entry node");
    (harness, node)
}

#[test]
fn test_serialization_dispatcher_prunes_library_types() {
    let (harness, caller) = entry_node(101);
    let hierarchy = harness.engine.hierarchy();
    let call = animal_call();
    let invoke = call.as_invoke().unwrap();

    let cha = DefaultDispatcher
        .possible_types_for_call(hierarchy, &caller, invoke)
        .unwrap();
    assert_eq!(cha.len(), 102);

    let dispatcher =
        SerializationDispatcher::new(TypeResolver::new(hierarchy, PruningConfig::default()));
    let types = dispatcher
        .possible_types_for_call(hierarchy, &caller, invoke)
        .unwrap();
    assert_eq!(
        types.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        vec![CAT]
    );
}

#[test]
fn test_serialization_dispatcher_keeps_small_sets() {
    let (harness, caller) = entry_node(3);
    let hierarchy = harness.engine.hierarchy();
    let call = animal_call();
    let dispatcher =
        SerializationDispatcher::new(TypeResolver::new(hierarchy, PruningConfig::default()));
    let types = dispatcher
        .possible_types_for_call(hierarchy, &caller, call.as_invoke().unwrap())
        .unwrap();
    assert_eq!(types.len(), 4);
}

// ============================================================
// EDGE CASES
// ============================================================

#[test]
fn test_unsound_dispatcher_defers_to_client() {
    let (harness, caller) = entry_node(1);
    let call = animal_call();
    assert!(UnsoundSerializationDispatcher
        .possible_types_for_call(harness.engine.hierarchy(), &caller, call.as_invoke().unwrap())
        .is_none());
}

#[test]
fn test_dispatchers_describe_themselves() {
    let (harness, _) = entry_node(0);
    let resolver = TypeResolver::new(harness.engine.hierarchy(), PruningConfig::default());
    let names = [
        DefaultDispatcher.describe(),
        SerializationDispatcher::new(resolver).describe(),
        UnsoundSerializationDispatcher.describe(),
    ];
    assert_eq!(names, ["cha", "serialization", "unsound"].map(String::from));
}
