//! Context-sensitive call graph
//!
//! Nodes are memoized on (method, context); edges are labelled with the
//! call-site pc and stored in a petgraph `DiGraph` whose node indices mirror
//! `NodeId`.

use crate::features::callgraph::domain::{CallGraphNode, Context, NodeId, NodeKind};
use crate::shared::models::MethodRef;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Default)]
pub struct CallGraph {
    nodes: Vec<CallGraphNode>,
    index: FxHashMap<(MethodRef, Context), NodeId>,
    graph: DiGraph<NodeId, u32>,
    edge_set: FxHashSet<(NodeId, u32, NodeId)>,
    entrypoints: Vec<NodeId>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoized node lookup/creation; returns the node and whether it is new.
    /// The kind of an existing node is never changed.
    pub fn find_or_create_node(
        &mut self,
        method: MethodRef,
        context: Context,
        kind: NodeKind,
    ) -> (NodeId, bool) {
        let key = (method, context);
        if let Some(id) = self.index.get(&key) {
            return (*id, false);
        }
        let id = NodeId(self.nodes.len() as u32);
        let (method, context) = key.clone();
        self.nodes.push(CallGraphNode {
            id,
            method,
            context,
            kind,
        });
        let index = self.graph.add_node(id);
        debug_assert_eq!(index.index(), id.index());
        self.index.insert(key, id);
        (id, true)
    }

    pub fn get_node(&self, method: &MethodRef, context: &Context) -> Option<NodeId> {
        self.index.get(&(method.clone(), context.clone())).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&CallGraphNode> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CallGraphNode> {
        self.nodes.iter()
    }

    pub fn model_nodes(&self) -> impl Iterator<Item = &CallGraphNode> {
        self.nodes.iter().filter(|n| n.is_model())
    }

    pub fn nodes_for_method<'a>(
        &'a self,
        method: &'a MethodRef,
    ) -> impl Iterator<Item = &'a CallGraphNode> + 'a {
        self.nodes.iter().filter(move |n| &n.method == method)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a call edge; returns false if it already existed
    pub fn add_edge(&mut self, caller: NodeId, pc: u32, callee: NodeId) -> bool {
        if !self.edge_set.insert((caller, pc, callee)) {
            return false;
        }
        self.graph.add_edge(
            NodeIndex::new(caller.index()),
            NodeIndex::new(callee.index()),
            pc,
        );
        true
    }

    pub fn has_edge(&self, caller: NodeId, callee: NodeId) -> bool {
        self.graph
            .find_edge(NodeIndex::new(caller.index()), NodeIndex::new(callee.index()))
            .is_some()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Distinct callees of a node
    pub fn successors(&self, caller: NodeId) -> Vec<NodeId> {
        let mut result: Vec<NodeId> = self
            .graph
            .neighbors_directed(NodeIndex::new(caller.index()), Direction::Outgoing)
            .map(|idx| self.graph[idx])
            .collect();
        result.sort();
        result.dedup();
        result
    }

    /// Callees reached from one call site
    pub fn targets_at(&self, caller: NodeId, pc: u32) -> Vec<NodeId> {
        let mut result: Vec<NodeId> = self
            .graph
            .edges_directed(NodeIndex::new(caller.index()), Direction::Outgoing)
            .filter(|edge| *edge.weight() == pc)
            .map(|edge| self.graph[edge.target()])
            .collect();
        result.sort();
        result
    }

    /// (caller, pc) pairs calling `callee`
    pub fn callers(&self, callee: NodeId) -> Vec<(NodeId, u32)> {
        let mut result: Vec<(NodeId, u32)> = self
            .graph
            .edges_directed(NodeIndex::new(callee.index()), Direction::Incoming)
            .map(|edge| (self.graph[edge.source()], *edge.weight()))
            .collect();
        result.sort();
        result
    }

    pub fn add_entrypoint(&mut self, node: NodeId) {
        if !self.entrypoints.contains(&node) {
            self.entrypoints.push(node);
        }
    }

    pub fn entrypoints(&self) -> &[NodeId] {
        &self.entrypoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Selector, TypeRef};

    fn method(name: &str) -> MethodRef {
        MethodRef::new(TypeRef::new("LA"), Selector::new(name, "()V"))
    }

    #[test]
    fn test_nodes_are_memoized() {
        let mut cg = CallGraph::new();
        let (a, created) = cg.find_or_create_node(method("a"), Context::Everywhere, NodeKind::Ordinary);
        assert!(created);
        let (again, created) =
            cg.find_or_create_node(method("a"), Context::Everywhere, NodeKind::Ordinary);
        assert!(!created);
        assert_eq!(a, again);
        assert_eq!(cg.len(), 1);
    }

    #[test]
    fn test_distinct_contexts_give_distinct_nodes() {
        let mut cg = CallGraph::new();
        let (a, _) = cg.find_or_create_node(method("a"), Context::Everywhere, NodeKind::Ordinary);
        let (b, _) = cg.find_or_create_node(
            method("a"),
            Context::CallerSite { caller: a, pc: 0 },
            NodeKind::Model,
        );
        assert_ne!(a, b);
        assert_eq!(cg.model_nodes().count(), 1);
        assert_eq!(cg.nodes_for_method(&method("a")).count(), 2);
    }

    #[test]
    fn test_kind_fixed_at_creation() {
        let mut cg = CallGraph::new();
        let (a, _) = cg.find_or_create_node(method("a"), Context::Everywhere, NodeKind::Ordinary);
        cg.find_or_create_node(method("a"), Context::Everywhere, NodeKind::Model);
        assert_eq!(cg.node(a).unwrap().kind, NodeKind::Ordinary);
    }

    #[test]
    fn test_edges() {
        let mut cg = CallGraph::new();
        let (a, _) = cg.find_or_create_node(method("a"), Context::Everywhere, NodeKind::Ordinary);
        let (b, _) = cg.find_or_create_node(method("b"), Context::Everywhere, NodeKind::Ordinary);
        let (c, _) = cg.find_or_create_node(method("c"), Context::Everywhere, NodeKind::Ordinary);
        assert!(cg.add_edge(a, 1, b));
        assert!(!cg.add_edge(a, 1, b));
        assert!(cg.add_edge(a, 2, c));
        assert!(cg.add_edge(a, 2, b));

        assert_eq!(cg.edge_count(), 3);
        assert_eq!(cg.successors(a), vec![b, c]);
        assert_eq!(cg.targets_at(a, 2), vec![b, c]);
        assert_eq!(cg.callers(b), vec![(a, 1), (a, 2)]);
        assert!(cg.has_edge(a, c));
        assert!(!cg.has_edge(c, a));
    }
}
