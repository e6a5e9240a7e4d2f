//! Mirrored adjacency maps shared by the dependency and call graphs.
//!
//! `Adjacency` owns a forward map and its reverse. The only way to add an edge
//! is `insert`, which writes both directions, so for every `a -> b` in
//! `forward` the edge `b -> a` exists in `reverse` and vice versa.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

/// Identifier -> set of identifiers, ordered for deterministic traversal.
pub type EdgeMap = BTreeMap<String, BTreeSet<String>>;

/// A set of identifiers that can all reach each other.
///
/// Members are sorted. A single member means a self-loop.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Cycle {
    /// Identifiers in the strongly connected component
    pub members: Vec<String>,
}

/// Forward edges plus their exact mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Adjacency {
    forward: EdgeMap,
    reverse: EdgeMap,
}

impl Adjacency {
    /// Create an empty adjacency.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `from -> to` and its mirror `to -> from`.
    ///
    /// Returns `true` if the edge was not already present.
    pub fn insert(&mut self, from: &str, to: &str) -> bool {
        let added = self
            .forward
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
        self.reverse
            .entry(to.to_string())
            .or_default()
            .insert(from.to_string());
        added
    }

    /// Union every edge of `other` into `self`.
    pub fn merge(&mut self, other: &Self) {
        for (from, targets) in &other.forward {
            for to in targets {
                self.insert(from, to);
            }
        }
    }

    /// Forward map (`a -> {b, ...}`).
    #[must_use]
    pub fn forward(&self) -> &EdgeMap {
        &self.forward
    }

    /// Reverse map (`b -> {a, ...}`).
    #[must_use]
    pub fn reverse(&self) -> &EdgeMap {
        &self.reverse
    }

    /// Forward neighbours of `node`, if it has any outgoing edge.
    #[must_use]
    pub fn successors(&self, node: &str) -> Option<&BTreeSet<String>> {
        self.forward.get(node)
    }

    /// Reverse neighbours of `node`, if it has any incoming edge.
    #[must_use]
    pub fn predecessors(&self, node: &str) -> Option<&BTreeSet<String>> {
        self.reverse.get(node)
    }

    /// Whether `from -> to` is present.
    #[must_use]
    pub fn contains(&self, from: &str, to: &str) -> bool {
        self.forward.get(from).is_some_and(|t| t.contains(to))
    }

    /// Total number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    /// Whether no edge has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Every identifier that appears on either end of an edge.
    #[must_use]
    pub fn nodes(&self) -> BTreeSet<&str> {
        self.forward
            .keys()
            .chain(self.reverse.keys())
            .map(String::as_str)
            .collect()
    }

    /// Verify that `forward` and `reverse` are exact mirrors.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        let forward_in_reverse = self.forward.iter().all(|(from, targets)| {
            targets
                .iter()
                .all(|to| self.reverse.get(to).is_some_and(|s| s.contains(from)))
        });
        let reverse_in_forward = self.reverse.iter().all(|(to, sources)| {
            sources
                .iter()
                .all(|from| self.forward.get(from).is_some_and(|t| t.contains(to)))
        });
        forward_in_reverse && reverse_in_forward
    }

    /// Copy the forward edges into a petgraph `DiGraph`.
    ///
    /// Nodes are added in sorted order, so indices are stable for a given
    /// edge set.
    #[must_use]
    pub fn to_petgraph(&self) -> (DiGraph<String, ()>, HashMap<String, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for node in self.nodes() {
            let idx = graph.add_node(node.to_string());
            index.insert(node.to_string(), idx);
        }
        for (from, targets) in &self.forward {
            for to in targets {
                if let (Some(&a), Some(&b)) = (index.get(from), index.get(to)) {
                    graph.add_edge(a, b, ());
                }
            }
        }

        (graph, index)
    }

    /// Strongly connected components that form cycles.
    ///
    /// Uses Tarjan's algorithm. Components with more than one member are
    /// always cycles; a single member counts only when it has a self-loop.
    /// The result is sorted.
    #[must_use]
    pub fn cycles(&self) -> Vec<Cycle> {
        let (graph, _) = self.to_petgraph();

        let mut cycles: Vec<Cycle> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&n| graph.contains_edge(n, n))
            })
            .map(|component| {
                let mut members: Vec<String> =
                    component.into_iter().map(|n| graph[n].clone()).collect();
                members.sort();
                Cycle { members }
            })
            .collect();

        cycles.sort();
        cycles
    }
}
