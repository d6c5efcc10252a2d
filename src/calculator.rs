//! Commit order calculation.
//!
//! A topological sort by depth-first search over a graph that may contain
//! cycles. The result is the reverse post-order of the search, so for an edge
//! `A -> B` outside any cycle `A` comes before `B`. When a back edge reaches an
//! in-progress node whose own edge back to the current node has a strictly
//! lower weight, that in-progress node is finalised on the spot: the lighter
//! edge is the one sacrificed. Runs in O(V + E).

use crate::error::Result;
use crate::graph::{Graph, VisitState, Weight};
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use tracing::{debug, trace};

/// Computes a commit order for a set of keyed payloads.
///
/// The calculator is single use per graph: `sort` consumes every registered
/// node and edge and leaves the calculator empty, ready for an unrelated graph.
#[derive(Debug, Clone)]
pub struct CommitOrderCalculator<K, V> {
    graph: Graph<K, V>,
}

impl<K, V> Default for CommitOrderCalculator<K, V> {
    fn default() -> Self {
        Self {
            graph: Graph::default(),
        }
    }
}

impl<K, V> CommitOrderCalculator<K, V>
where
    K: Hash + Eq + fmt::Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_node<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.graph.has_node(key)
    }

    pub fn add_node(&mut self, key: impl Into<K>, value: V) {
        self.graph.add_node(key.into(), value);
    }

    /// Add the edge `from -> to`, placing `from` before `to` unless a cycle
    /// through both is broken in favour of a heavier edge.
    pub fn add_dependency<Q>(&mut self, from: &Q, to: impl Into<K>, weight: Weight) -> Result<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        self.graph.add_dependency(from, to.into(), weight)
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Return every registered payload exactly once, in commit order.
    ///
    /// The calculator is emptied whether or not the sort succeeds. Fails if an
    /// edge points at a key that was never registered.
    pub fn sort(&mut self) -> Result<Vec<V>> {
        let mut graph = std::mem::take(&mut self.graph);
        trace!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "computing commit order"
        );

        let mut order = Traversal::run(&mut graph)?;
        order.reverse();

        let mut values: Vec<Option<V>> = graph.into_values().map(Some).collect();
        Ok(order
            .into_iter()
            .filter_map(|index| values[index].take())
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    /// Regular depth-first visit of a node
    Visit,
    /// Finish the unvisited neighbours of an in-progress node, then finalise it
    Drain,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    cursor: usize,
    kind: FrameKind,
}

/// Depth-first search state for a single sort, on an explicit stack
struct Traversal<'g, K, V> {
    graph: &'g mut Graph<K, V>,
    adjacency: Vec<Vec<(usize, Weight)>>,
    stack: Vec<Frame>,
    post_order: Vec<usize>,
}

impl<'g, K, V> Traversal<'g, K, V>
where
    K: Hash + Eq + fmt::Display,
{
    /// Visit every node in registration order and return the post-order
    fn run(graph: &'g mut Graph<K, V>) -> Result<Vec<usize>> {
        let adjacency = graph.resolve()?;
        let node_count = adjacency.len();
        let mut traversal = Self {
            graph,
            adjacency,
            stack: Vec::new(),
            post_order: Vec::with_capacity(node_count),
        };

        for root in 0..node_count {
            if traversal.graph.state(root) == VisitState::NotVisited {
                traversal.visit(root);
            }
        }

        Ok(traversal.post_order)
    }

    fn visit(&mut self, root: usize) {
        self.enter(root);

        while let Some(frame) = self.stack.last_mut() {
            let edge = self.adjacency[frame.node].get(frame.cursor).copied();
            frame.cursor += 1;
            let Frame { node, kind, .. } = *frame;

            let Some((target, weight)) = edge else {
                self.stack.pop();
                self.finalize(node);
                continue;
            };

            match self.graph.state(target) {
                VisitState::Visited => {}
                VisitState::NotVisited => self.enter(target),
                VisitState::InProgress => {
                    if kind == FrameKind::Visit && self.breaks_cycle(node, target, weight) {
                        self.stack.push(Frame {
                            node: target,
                            cursor: 0,
                            kind: FrameKind::Drain,
                        });
                    }
                }
            }
        }
    }

    fn enter(&mut self, node: usize) {
        self.graph.set_state(node, VisitState::InProgress);
        self.stack.push(Frame {
            node,
            cursor: 0,
            kind: FrameKind::Visit,
        });
    }

    /// A node can be finalised more than once when cycle resolutions nest;
    /// only the first one is recorded.
    fn finalize(&mut self, node: usize) {
        if self.graph.state(node) == VisitState::Visited {
            return;
        }
        self.graph.set_state(node, VisitState::Visited);
        self.post_order.push(node);
    }

    /// `node -> target` closes a cycle. It wins only if `target -> node`
    /// exists and is strictly lighter. A self loop never wins.
    fn breaks_cycle(&self, node: usize, target: usize, weight: Weight) -> bool {
        match self.graph.edge_weight(target, node) {
            Some(reverse) if reverse < weight => {
                if let (Some(from), Some(to)) = (self.graph.key(node), self.graph.key(target)) {
                    debug!(%from, %to, weight, reverse, "breaking cycle on the lighter edge");
                }
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrderError;

    fn calculator(keys: &[&'static str]) -> CommitOrderCalculator<String, &'static str> {
        let mut calculator = CommitOrderCalculator::new();
        for &key in keys {
            calculator.add_node(key, key);
        }
        calculator
    }

    #[test]
    fn test_empty_graph() {
        let mut calculator = calculator(&[]);
        assert!(calculator.sort().unwrap().is_empty());
    }

    #[test]
    fn test_single_valid_order() {
        let mut calculator = calculator(&["t1", "t2", "t3", "t4", "t5"]);
        calculator.add_dependency("t1", "t2", 1).unwrap();
        calculator.add_dependency("t2", "t3", 1).unwrap();
        calculator.add_dependency("t3", "t4", 1).unwrap();
        calculator.add_dependency("t5", "t1", 1).unwrap();

        assert_eq!(calculator.sort().unwrap(), vec!["t5", "t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn test_two_cycle_breaks_lighter_edge() {
        let mut calculator = calculator(&["t1", "t2"]);
        calculator.add_dependency("t1", "t2", 0).unwrap();
        calculator.add_dependency("t2", "t1", 1).unwrap();

        assert_eq!(calculator.sort().unwrap(), vec!["t2", "t1"]);
    }

    #[test]
    fn test_two_cycle_independent_of_registration_order() {
        let mut calculator = calculator(&["b", "a"]);
        calculator.add_dependency("a", "b", 5).unwrap();
        calculator.add_dependency("b", "a", 1).unwrap();

        assert_eq!(calculator.sort().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_cycle_with_nullable_link() {
        let mut calculator = calculator(&["t1", "t2", "t3", "t4"]);
        calculator.add_dependency("t4", "t1", 1).unwrap();
        calculator.add_dependency("t1", "t2", 1).unwrap();
        calculator.add_dependency("t4", "t3", 1).unwrap();
        calculator.add_dependency("t1", "t4", 0).unwrap();

        let sorted = calculator.sort().unwrap();
        let valid = [
            vec!["t4", "t1", "t2", "t3"],
            vec!["t4", "t1", "t3", "t2"],
            vec!["t4", "t3", "t1", "t2"],
        ];
        assert!(valid.contains(&sorted), "unexpected order {sorted:?}");
    }

    #[test]
    fn test_equal_weights_follow_traversal() {
        let mut calculator = calculator(&["a", "b"]);
        calculator.add_dependency("a", "b", 1).unwrap();
        calculator.add_dependency("b", "a", 1).unwrap();

        assert_eq!(calculator.sort().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_self_loop_is_ignored() {
        let mut calculator = calculator(&["a", "b"]);
        calculator.add_dependency("a", "a", 3).unwrap();
        calculator.add_dependency("b", "a", 1).unwrap();

        assert_eq!(calculator.sort().unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_nested_resolution_emits_once() {
        // x is force-finalised from both a and y while its own visit is open
        let mut calculator = calculator(&["x", "a", "y"]);
        calculator.add_dependency("x", "a", 1).unwrap();
        calculator.add_dependency("x", "y", 2).unwrap();
        calculator.add_dependency("a", "x", 5).unwrap();
        calculator.add_dependency("y", "x", 3).unwrap();

        assert_eq!(calculator.sort().unwrap(), vec!["a", "y", "x"]);
    }

    #[test]
    fn test_isolated_nodes_keep_registration_order() {
        let mut calculator = calculator(&["a", "b", "c"]);
        assert_eq!(calculator.sort().unwrap(), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_dangling_target_fails_and_resets() {
        let mut calculator = calculator(&["a"]);
        calculator.add_dependency("a", "missing", 1).unwrap();

        let result = calculator.sort();
        assert!(matches!(result, Err(OrderError::DanglingDependency { .. })));
        assert!(calculator.is_empty());

        calculator.add_node("b", "b");
        assert_eq!(calculator.sort().unwrap(), vec!["b"]);
    }

    #[test]
    fn test_unknown_source_rejected() {
        let mut calculator = calculator(&["a"]);
        let result = calculator.add_dependency("nope", "a", 1);
        assert!(matches!(result, Err(OrderError::UnknownNode(_))));
    }

    #[test]
    fn test_sort_resets_state() {
        let mut calculator = calculator(&["a", "b"]);
        calculator.add_dependency("b", "a", 1).unwrap();
        assert_eq!(calculator.sort().unwrap(), vec!["b", "a"]);
        assert!(calculator.is_empty());
        assert!(!calculator.has_node("a"));

        calculator.add_node("a", "a");
        calculator.add_node("c", "c");
        calculator.add_dependency("a", "c", 1).unwrap();
        assert_eq!(calculator.sort().unwrap(), vec!["a", "c"]);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let keys: Vec<String> = (0..100_000).map(|i| format!("n{i}")).collect();
        let mut calculator: CommitOrderCalculator<String, usize> = CommitOrderCalculator::new();
        for (i, key) in keys.iter().enumerate() {
            calculator.add_node(key.clone(), i);
        }
        for pair in keys.windows(2) {
            calculator.add_dependency(pair[0].as_str(), pair[1].clone(), 1).unwrap();
        }

        let sorted = calculator.sort().unwrap();
        assert_eq!(sorted, (0..100_000).collect::<Vec<_>>());
    }
}
