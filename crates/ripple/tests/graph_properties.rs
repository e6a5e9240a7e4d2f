//! Property tests for graph construction and traversal.
//!
//! Random edge sets over a small alphabet of node names exercise:
//! - the forward/reverse mirror held by every graph
//! - order independence of graph construction
//! - the depth bound and connectivity of impact and call chains

use proptest::prelude::*;
use ripple::impact::{trace_downstream, trace_upstream};
use ripple::{CallGraph, DependencyGraph, Language, StructuralRecord};

const NAMES: &[&str] = &["A", "B", "C", "D", "E", "F", "G"];

fn edges() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..NAMES.len(), 0..NAMES.len()), 0..24)
}

fn graph_of(edges: &[(usize, usize)]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for &(from, to) in edges {
        graph.add_dependency(NAMES[from], NAMES[to]);
    }
    graph
}

fn records_of(edges: &[(usize, usize)]) -> Vec<StructuralRecord> {
    edges
        .iter()
        .map(|&(from, to)| {
            let mut record = StructuralRecord::empty(NAMES[from], Language::Python);
            record.imports.push(NAMES[to].to_string());
            record
        })
        .collect()
}

proptest! {
    #[test]
    fn every_graph_is_mirrored(edges in edges()) {
        let graph = DependencyGraph::build(&records_of(&edges));
        prop_assert!(graph.is_mirrored());
    }

    #[test]
    fn construction_ignores_record_order(edges in edges()) {
        let records = records_of(&edges);
        let mut reversed = records.clone();
        reversed.reverse();

        let forward = DependencyGraph::build(&records);
        prop_assert_eq!(&forward, &DependencyGraph::build(&reversed));
        prop_assert_eq!(&forward, &DependencyGraph::build_parallel(&records));
    }

    #[test]
    fn impact_chains_respect_depth_and_follow_edges(
        edges in edges(),
        root in 0..NAMES.len(),
        depth in 0usize..5,
    ) {
        let graph = graph_of(&edges);
        let root = NAMES[root];

        for (chains, map) in [
            (trace_upstream(&graph, root, depth), graph.reverse_dependencies()),
            (trace_downstream(&graph, root, depth), graph.dependencies()),
        ] {
            prop_assert!(!chains.is_empty());
            for chain in &chains {
                prop_assert_eq!(chain.nodes()[0].as_str(), root);
                prop_assert!(chain.len() <= depth + 1);
                for pair in chain.nodes().windows(2) {
                    prop_assert!(map.get(&pair[0]).is_some_and(|next| next.contains(&pair[1])));
                }
            }
        }
    }

    #[test]
    fn call_chains_respect_depth(
        edges in edges(),
        root in 0..NAMES.len(),
        depth in 0usize..5,
    ) {
        let mut graph = CallGraph::new();
        for &(from, to) in &edges {
            graph.add_call(NAMES[from], NAMES[to]);
        }
        prop_assert!(graph.is_mirrored());

        let root = NAMES[root];
        for chain in graph.call_chain(root, depth) {
            prop_assert_eq!(chain[0].as_str(), root);
            prop_assert!(chain.len() <= depth + 1);
        }
        for chain in graph.reverse_call_chain(root, depth) {
            prop_assert_eq!(chain.last().map(String::as_str), Some(root));
            prop_assert!(chain.len() <= depth + 1);
        }
    }
}
