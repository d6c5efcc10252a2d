//! In-memory directed graph with weighted, registration-ordered edges.

use crate::error::{OrderError, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use tracing::warn;

/// Edge weight. When a cycle must be broken, the lower weight loses.
pub type Weight = i64;

/// Traversal colour of a node during one sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum VisitState {
    NotVisited,
    InProgress,
    Visited,
}

/// A vertex: the caller's payload plus its outgoing edges keyed by target
#[derive(Debug, Clone)]
struct Node<K, V> {
    value: V,
    state: VisitState,
    edges: IndexMap<K, Weight>,
}

impl<K, V> Node<K, V> {
    fn new(value: V) -> Self {
        Self {
            value,
            state: VisitState::NotVisited,
            edges: IndexMap::new(),
        }
    }
}

/// Working set of nodes and edges for one sort pass.
///
/// Nodes and edges are iterated in registration order, which decides the
/// order produced among otherwise equivalent candidates.
#[derive(Debug, Clone)]
pub struct Graph<K, V> {
    nodes: IndexMap<K, Node<K, V>>,
}

impl<K, V> Default for Graph<K, V> {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
        }
    }
}

impl<K, V> Graph<K, V>
where
    K: Hash + Eq + fmt::Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a node with this key has been registered
    pub fn has_node<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.nodes.contains_key(key)
    }

    /// Register a node. Re-registering a key replaces the old record (and its
    /// edges) but keeps its position.
    pub fn add_node(&mut self, key: K, value: V) {
        match self.nodes.entry(key) {
            Entry::Occupied(mut entry) => {
                warn!(key = %entry.key(), "node registered twice, keeping the last value");
                entry.insert(Node::new(value));
            }
            Entry::Vacant(entry) => {
                entry.insert(Node::new(value));
            }
        }
    }

    /// Add the edge `from -> to`. `from` must already be registered; `to` is
    /// only resolved when the graph is sorted.
    pub fn add_dependency<Q>(&mut self, from: &Q, to: K, weight: Weight) -> Result<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        let node = self
            .nodes
            .get_mut(from)
            .ok_or_else(|| OrderError::UnknownNode(from.to_string()))?;
        node.edges.insert(to, weight);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|node| node.edges.len()).sum()
    }

    /// Translate every edge target into a node index.
    ///
    /// Fails on the first edge whose target was never registered.
    pub(crate) fn resolve(&self) -> Result<Vec<Vec<(usize, Weight)>>> {
        self.nodes
            .iter()
            .map(|(from, node)| {
                node.edges
                    .iter()
                    .map(|(to, &weight)| {
                        self.nodes
                            .get_index_of(to)
                            .map(|index| (index, weight))
                            .ok_or_else(|| OrderError::DanglingDependency {
                                from: from.to_string(),
                                to: to.to_string(),
                            })
                    })
                    .collect()
            })
            .collect()
    }

    pub(crate) fn key(&self, index: usize) -> Option<&K> {
        self.nodes.get_index(index).map(|(key, _)| key)
    }

    pub(crate) fn state(&self, index: usize) -> VisitState {
        self.nodes[index].state
    }

    pub(crate) fn set_state(&mut self, index: usize, state: VisitState) {
        debug_assert!(self.nodes[index].state <= state, "visit state never goes back");
        self.nodes[index].state = state;
    }

    /// Weight of the edge between two nodes addressed by index
    pub(crate) fn edge_weight(&self, from: usize, to: usize) -> Option<Weight> {
        let to_key = self.key(to)?;
        self.nodes.get_index(from)?.1.edges.get(to_key).copied()
    }

    pub(crate) fn into_values(self) -> impl Iterator<Item = V> {
        self.nodes.into_values().map(|node| node.value)
    }
}
