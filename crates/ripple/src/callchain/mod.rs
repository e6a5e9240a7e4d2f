//! Function-level call graphs and call-chain tracing.
//!
//! Finer-grained than the dependency graph: functions are found by
//! brace/indentation matching, call sites by a lexical scan of each body.
//!
//! Chain tracing here checks for cycles **per path**: a node already on the
//! current path ends that path with a `"<name> (cycle)"` marker, while other
//! paths through the same node stay explorable. The visited-once policy of
//! [`crate::impact`] never re-enters a node at all.

mod functions;

pub use functions::{FunctionBody, extract_functions};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::graph::{Adjacency, Cycle, EdgeMap};
use crate::types::Language;

/// Suffix appended to a node that closes a cycle in a traced chain.
pub const CYCLE_MARKER: &str = " (cycle)";

/// One call path, in reading order.
///
/// Forward chains start at the traced function and end at a callee; reverse
/// chains end at the traced function and start at a caller.
pub type CallChain = Vec<String>;

/// Build the call graph of one file's text.
#[must_use]
pub fn build_call_graph(content: &str, path: &str, language: Language) -> CallGraph {
    CallGraph::build(content, path, language)
}

/// Function-level call graph for one file or a batch of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallGraph {
    language: Option<Language>,
    functions: BTreeMap<String, FunctionBody>,
    calls: Adjacency,
}

impl CallGraph {
    /// Create an empty call graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the call graph of one file.
    #[must_use]
    pub fn build(content: &str, path: &str, language: Language) -> Self {
        let mut graph = Self {
            language: Some(language),
            ..Self::default()
        };
        for function in extract_functions(content, path, language) {
            graph.add_function(function);
        }
        debug!(
            file = %path,
            functions = graph.functions.len(),
            edges = graph.edge_count(),
            "Built call graph"
        );
        graph
    }

    /// Register a function and its outgoing calls.
    ///
    /// Functions are keyed by name: a later function with the same name
    /// replaces the stored body, while the call edges of both remain.
    pub fn add_function(&mut self, function: FunctionBody) {
        for callee in &function.calls {
            self.calls.insert(&function.name, callee);
        }
        self.functions.insert(function.name.clone(), function);
    }

    /// Add a single call edge and its mirror.
    pub fn add_call(&mut self, caller: &str, callee: &str) {
        self.calls.insert(caller, callee);
    }

    /// Fold another call graph into this one.
    pub fn merge(&mut self, other: &Self) {
        if self.language.is_none() {
            self.language = other.language;
        }
        for (name, function) in &other.functions {
            self.functions.insert(name.clone(), function.clone());
        }
        self.calls.merge(&other.calls);
    }

    /// Language of the source the graph was built from.
    #[must_use]
    pub fn language(&self) -> Option<Language> {
        self.language
    }

    /// Functions by name.
    #[must_use]
    pub fn functions(&self) -> &BTreeMap<String, FunctionBody> {
        &self.functions
    }

    /// Look up a function by name.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionBody> {
        self.functions.get(name)
    }

    /// `caller -> callees`.
    #[must_use]
    pub fn call_graph(&self) -> &EdgeMap {
        self.calls.forward()
    }

    /// `callee -> callers`.
    #[must_use]
    pub fn reverse_call_graph(&self) -> &EdgeMap {
        self.calls.reverse()
    }

    /// Direct callees of `name`.
    #[must_use]
    pub fn callees_of(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.calls.successors(name)
    }

    /// Direct callers of `name`.
    #[must_use]
    pub fn callers_of(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.calls.predecessors(name)
    }

    /// Number of distinct call edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.calls.edge_count()
    }

    /// Whether the call maps mirror each other.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.calls.is_mirrored()
    }

    /// Defined functions that no function calls.
    #[must_use]
    pub fn entry_functions(&self) -> Vec<&str> {
        self.functions
            .keys()
            .filter(|name| self.calls.predecessors(name).is_none())
            .map(String::as_str)
            .collect()
    }

    /// Defined functions that call nothing.
    #[must_use]
    pub fn leaf_functions(&self) -> Vec<&str> {
        self.functions
            .keys()
            .filter(|name| self.calls.successors(name).is_none())
            .map(String::as_str)
            .collect()
    }

    /// Recursive call groups, via Tarjan's strongly connected components.
    #[must_use]
    pub fn cycles(&self) -> Vec<Cycle> {
        self.calls.cycles()
    }

    /// Chains of calls starting at `name`, at most `max_depth` calls deep.
    #[must_use]
    pub fn call_chain(&self, name: &str, max_depth: usize) -> Vec<CallChain> {
        let mut walk = PerPathWalk {
            edges: self.call_graph(),
            max_depth,
            chains: Vec::new(),
        };
        walk.visit(name, &mut Vec::new(), 0);
        walk.chains
    }

    /// Chains of callers that lead to `name`, each ending at `name`.
    #[must_use]
    pub fn reverse_call_chain(&self, name: &str, max_depth: usize) -> Vec<CallChain> {
        let mut walk = PerPathWalk {
            edges: self.reverse_call_graph(),
            max_depth,
            chains: Vec::new(),
        };
        walk.visit(name, &mut Vec::new(), 0);
        walk.chains
            .into_iter()
            .map(|mut chain| {
                chain.reverse();
                chain
            })
            .collect()
    }
}

/// Serialized as the function table plus both call maps.
impl Serialize for CallGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct View<'a> {
            language: Option<Language>,
            functions: &'a BTreeMap<String, FunctionBody>,
            call_graph: &'a EdgeMap,
            reverse_call_graph: &'a EdgeMap,
        }

        View {
            language: self.language,
            functions: &self.functions,
            call_graph: self.call_graph(),
            reverse_call_graph: self.reverse_call_graph(),
        }
        .serialize(serializer)
    }
}

/// Depth-first walk that only refuses nodes already on the current path.
struct PerPathWalk<'a> {
    edges: &'a EdgeMap,
    max_depth: usize,
    chains: Vec<CallChain>,
}

impl PerPathWalk<'_> {
    /// Visit `node` below `path`; returns whether a chain was emitted.
    fn visit(&mut self, node: &str, path: &mut Vec<String>, depth: usize) -> bool {
        if depth > self.max_depth {
            return false;
        }
        if path.iter().any(|n| n == node) {
            let mut chain = path.clone();
            chain.push(format!("{node}{CYCLE_MARKER}"));
            self.chains.push(chain);
            return true;
        }

        path.push(node.to_string());
        let mut emitted = false;
        if let Some(next) = self.edges.get(node) {
            for callee in next {
                emitted |= self.visit(callee, path, depth + 1);
            }
        }
        if !emitted {
            self.chains.push(path.clone());
        }
        path.pop();
        true
    }
}
