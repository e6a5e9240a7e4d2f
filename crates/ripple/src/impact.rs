//! Change-impact tracing over a `DependencyGraph`.
//!
//! For each changed item two depth-first searches run:
//!
//! - **upstream** follows `reverse_dependencies` ("who depends on me")
//! - **downstream** follows `dependencies` ("what do I depend on")
//!
//! Each search shares one `visited` set across all of its branches. Once a
//! node has been expanded anywhere in the search it is never expanded again,
//! even when reached along a different path. Some alternate chains are
//! therefore never reported; in exchange the work per root is bounded by the
//! number of nodes.
//!
//! A path ends, and is reported as a chain, when its last node has no
//! neighbours in the traversal direction, or when every neighbour was
//! suppressed (already visited or past the depth cap). No chain is longer
//! than `max_depth + 1` nodes.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::graph::{DependencyGraph, EdgeMap};

/// Which edge direction a trace follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards dependents
    Upstream,
    /// Towards dependencies
    Downstream,
}

impl Direction {
    /// Arrow used when rendering a chain in this direction.
    #[must_use]
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Upstream => "←",
            Direction::Downstream => "→",
        }
    }
}

/// One path found by a trace, root first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImpactChain(pub Vec<String>);

impl ImpactChain {
    /// Identifiers along the path.
    #[must_use]
    pub fn nodes(&self) -> &[String] {
        &self.0
    }

    /// Number of identifiers in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the chain is empty. Traces never produce empty chains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Join the chain with the arrow for `direction`.
    #[must_use]
    pub fn render(&self, direction: Direction) -> String {
        self.0.join(&format!(" {} ", direction.arrow()))
    }
}

/// Result of tracing a set of changed items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    /// Traced roots, duplicates removed, input order kept
    pub changed_items: Vec<String>,
    /// Upstream chains per root
    pub upstream: BTreeMap<String, Vec<ImpactChain>>,
    /// Downstream chains per root
    pub downstream: BTreeMap<String, Vec<ImpactChain>>,
    /// Distinct identifiers across every chain of every root
    pub total_affected: usize,
    /// Roots that do not appear in the graph at all
    pub unknown_roots: Vec<String>,
    /// Depth cap the trace ran with
    pub max_depth: usize,
}

impl ImpactReport {
    /// Chains for `item` in `direction`.
    #[must_use]
    pub fn chains(&self, item: &str, direction: Direction) -> &[ImpactChain] {
        let map = match direction {
            Direction::Upstream => &self.upstream,
            Direction::Downstream => &self.downstream,
        };
        map.get(item).map_or(&[], Vec::as_slice)
    }

    /// Every identifier appearing in any chain, roots included.
    #[must_use]
    pub fn affected(&self) -> BTreeSet<&str> {
        self.upstream
            .values()
            .chain(self.downstream.values())
            .flatten()
            .flat_map(|chain| chain.nodes().iter().map(String::as_str))
            .collect()
    }
}

/// Trace upstream and downstream impact of every changed item.
///
/// An item absent from the graph is not an error: each direction yields the
/// single chain `[item]` and the item is listed in `unknown_roots`.
#[must_use]
pub fn trace_impact(
    graph: &DependencyGraph,
    changed_items: &[String],
    max_depth: usize,
) -> ImpactReport {
    let mut report = ImpactReport {
        max_depth,
        ..ImpactReport::default()
    };

    for item in changed_items {
        if report.upstream.contains_key(item) {
            continue;
        }
        if !graph.contains(item) {
            report.unknown_roots.push(item.clone());
        }
        report.changed_items.push(item.clone());
        report.upstream.insert(
            item.clone(),
            trace(graph.reverse_dependencies(), item, max_depth),
        );
        report.downstream.insert(
            item.clone(),
            trace(graph.dependencies(), item, max_depth),
        );
    }

    report.total_affected = report.affected().len();
    debug!(
        roots = report.changed_items.len(),
        affected = report.total_affected,
        unknown = report.unknown_roots.len(),
        "Traced impact"
    );
    report
}

/// Upstream chains of a single item.
#[must_use]
pub fn trace_upstream(graph: &DependencyGraph, item: &str, max_depth: usize) -> Vec<ImpactChain> {
    trace(graph.reverse_dependencies(), item, max_depth)
}

/// Downstream chains of a single item.
#[must_use]
pub fn trace_downstream(
    graph: &DependencyGraph,
    item: &str,
    max_depth: usize,
) -> Vec<ImpactChain> {
    trace(graph.dependencies(), item, max_depth)
}

fn trace(edges: &EdgeMap, root: &str, max_depth: usize) -> Vec<ImpactChain> {
    let mut walk = VisitedOnceWalk {
        edges,
        max_depth,
        visited: BTreeSet::new(),
        chains: Vec::new(),
    };
    let mut path = vec![root.to_string()];
    walk.visit(root, &mut path, 0);
    walk.chains
}

/// Depth-first walk with one visited set for the whole search.
struct VisitedOnceWalk<'a> {
    edges: &'a EdgeMap,
    max_depth: usize,
    visited: BTreeSet<String>,
    chains: Vec<ImpactChain>,
}

impl VisitedOnceWalk<'_> {
    /// Visit `node` at the end of `path`; returns whether any chain was
    /// emitted from this node or below it.
    fn visit(&mut self, node: &str, path: &mut Vec<String>, depth: usize) -> bool {
        if depth > self.max_depth || !self.visited.insert(node.to_string()) {
            return false;
        }

        let mut emitted = false;
        if let Some(neighbours) = self.edges.get(node) {
            for next in neighbours {
                path.push(next.clone());
                emitted |= self.visit(next, path, depth + 1);
                path.pop();
            }
        }

        if !emitted {
            self.chains.push(ImpactChain(path.clone()));
        }
        true
    }
}
