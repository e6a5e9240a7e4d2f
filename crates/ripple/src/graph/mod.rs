//! File- and class-level dependency graph.
//!
//! `DependencyGraph::build` folds structural records into four maps:
//!
//! | Map | Edge | Source |
//! |-----|------|--------|
//! | `dependencies` | `file -> import`, `class -> parent`, `class -> interface` | every record |
//! | `reverse_dependencies` | exact mirror of `dependencies` | written alongside |
//! | `inheritance` | `class -> parent` | classes with a parent |
//! | `implementations` | `class -> interface` | implemented interfaces |
//!
//! Identifiers are plain strings: a file's path for import edges, the bare
//! class name for inheritance edges. Two files declaring the same class name
//! share one node.
//!
//! The builder only ever adds edges. A graph is a value returned to the
//! caller; rebuilding after files were removed means building a fresh graph.

mod adjacency;

pub use adjacency::{Adjacency, Cycle, EdgeMap};

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::types::StructuralRecord;

/// Bidirectional dependency graph over files, classes and interfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: Adjacency,
    inheritance: EdgeMap,
    implementations: EdgeMap,
}

impl DependencyGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a set of records.
    ///
    /// Record order does not matter; edge insertion is a set union.
    #[must_use]
    pub fn build(records: &[StructuralRecord]) -> Self {
        let mut graph = Self::new();
        for record in records {
            graph.add_record(record);
        }
        debug!(
            records = records.len(),
            edges = graph.edge_count(),
            "Built dependency graph"
        );
        graph
    }

    /// Build a graph from a large record set using per-worker partial graphs.
    ///
    /// Produces exactly the graph `build` would.
    #[must_use]
    pub fn build_parallel(records: &[StructuralRecord]) -> Self {
        let graph = records
            .par_iter()
            .fold(Self::new, |mut partial, record| {
                partial.add_record(record);
                partial
            })
            .reduce(Self::new, |mut left, right| {
                left.merge(&right);
                left
            });
        debug!(
            records = records.len(),
            edges = graph.edge_count(),
            "Built dependency graph in parallel"
        );
        graph
    }

    /// Add every edge one record contributes.
    pub fn add_record(&mut self, record: &StructuralRecord) {
        for import in &record.imports {
            self.add_dependency(&record.path, import);
        }
        for class in &record.classes {
            if let Some(parent) = &class.parent {
                self.add_inheritance(&class.name, parent);
            }
            for interface in &class.interfaces {
                self.add_implementation(&class.name, interface);
            }
        }
    }

    /// Add a plain dependency edge and its mirror.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        self.edges.insert(from, to);
    }

    /// Add `child -> parent` to the dependency maps and to `inheritance`.
    pub fn add_inheritance(&mut self, child: &str, parent: &str) {
        self.edges.insert(child, parent);
        self.inheritance
            .entry(child.to_string())
            .or_default()
            .insert(parent.to_string());
    }

    /// Add `class -> interface` to the dependency maps and to `implementations`.
    pub fn add_implementation(&mut self, class: &str, interface: &str) {
        self.edges.insert(class, interface);
        self.implementations
            .entry(class.to_string())
            .or_default()
            .insert(interface.to_string());
    }

    /// Union every edge of `other` into this graph.
    pub fn merge(&mut self, other: &Self) {
        self.edges.merge(&other.edges);
        for (child, parents) in &other.inheritance {
            self.inheritance
                .entry(child.clone())
                .or_default()
                .extend(parents.iter().cloned());
        }
        for (class, interfaces) in &other.implementations {
            self.implementations
                .entry(class.clone())
                .or_default()
                .extend(interfaces.iter().cloned());
        }
    }

    /// `item -> what it depends on`.
    #[must_use]
    pub fn dependencies(&self) -> &EdgeMap {
        self.edges.forward()
    }

    /// `item -> what depends on it`.
    #[must_use]
    pub fn reverse_dependencies(&self) -> &EdgeMap {
        self.edges.reverse()
    }

    /// `child -> parents`.
    #[must_use]
    pub fn inheritance(&self) -> &EdgeMap {
        &self.inheritance
    }

    /// `class -> implemented interfaces`.
    #[must_use]
    pub fn implementations(&self) -> &EdgeMap {
        &self.implementations
    }

    /// The underlying mirrored edge set.
    #[must_use]
    pub fn edges(&self) -> &Adjacency {
        &self.edges
    }

    /// Direct dependencies of `item`, if any.
    #[must_use]
    pub fn dependencies_of(&self, item: &str) -> Option<&BTreeSet<String>> {
        self.edges.successors(item)
    }

    /// Direct dependents of `item`, if any.
    #[must_use]
    pub fn dependents_of(&self, item: &str) -> Option<&BTreeSet<String>> {
        self.edges.predecessors(item)
    }

    /// Whether `item` appears on either end of any edge.
    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        self.edges.forward().contains_key(item) || self.edges.reverse().contains_key(item)
    }

    /// Number of distinct dependency edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.edge_count()
    }

    /// Number of distinct identifiers.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.edges.nodes().len()
    }

    /// Whether the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether `dependencies` and `reverse_dependencies` mirror each other.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.edges.is_mirrored()
    }

    /// Dependency cycles, via Tarjan's strongly connected components.
    #[must_use]
    pub fn cycles(&self) -> Vec<Cycle> {
        self.edges.cycles()
    }
}

/// Serialized as the four named maps.
impl Serialize for DependencyGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct View<'a> {
            dependencies: &'a EdgeMap,
            reverse_dependencies: &'a EdgeMap,
            inheritance: &'a EdgeMap,
            implementations: &'a EdgeMap,
        }

        View {
            dependencies: self.dependencies(),
            reverse_dependencies: self.reverse_dependencies(),
            inheritance: &self.inheritance,
            implementations: &self.implementations,
        }
        .serialize(serializer)
    }
}
