//! One-way export of structural facts into a property-graph shape.
//!
//! Records become `File`, `Class` and `Method` nodes joined by `CONTAINS`,
//! `HAS_METHOD`, `EXTENDS`, `IMPLEMENTS` and `CALLS` edges. Any backend that
//! implements `GraphSink` can receive them; `JsonLinesSink` writes one JSON
//! object per line, suitable for bulk import into a graph database.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::callchain::CallGraph;
use crate::error::Result;
use crate::types::StructuralRecord;

/// Node label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum NodeLabel {
    /// A source file
    File,
    /// A class, interface or enum
    Class,
    /// A method or top-level function
    Method,
}

/// Edge label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeLabel {
    /// File contains class or top-level function
    Contains,
    /// Class declares method
    HasMethod,
    /// Class extends parent
    Extends,
    /// Class implements interface
    Implements,
    /// Function calls function
    Calls,
}

/// A node to export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportNode {
    /// Node label
    pub label: NodeLabel,
    /// Identifier, unique per label
    pub id: String,
    /// Display name
    pub name: String,
    /// Declaring file, for classes and methods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Declaration line, for classes and methods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// An edge to export.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ExportEdge {
    /// Edge label
    pub label: EdgeLabel,
    /// Source node id
    pub from: String,
    /// Target node id
    pub to: String,
}

/// Receiver for exported nodes and edges.
pub trait GraphSink {
    /// Accept one node.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects or cannot store the node.
    fn node(&mut self, node: &ExportNode) -> Result<()>;

    /// Accept one edge. Both endpoints have already been sent as nodes,
    /// except for `EXTENDS`/`IMPLEMENTS`/`CALLS` targets declared outside the
    /// exported records.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects or cannot store the edge.
    fn edge(&mut self, edge: &ExportEdge) -> Result<()>;

    /// Called once after the last element.
    ///
    /// # Errors
    ///
    /// Returns an error if pending output cannot be flushed.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Counts of exported elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    /// Distinct nodes sent
    pub nodes: usize,
    /// Distinct edges sent
    pub edges: usize,
}

/// Writes each element as one JSON object per line.
///
/// Lines carry a `"type": "node"` or `"type": "edge"` tag.
pub struct JsonLinesSink<W: Write> {
    writer: BufWriter<W>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Line<'a> {
    Node(&'a ExportNode),
    Edge(&'a ExportEdge),
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffered output cannot be flushed.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }

    fn write_line(&mut self, line: &Line<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, line)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> GraphSink for JsonLinesSink<W> {
    fn node(&mut self, node: &ExportNode) -> Result<()> {
        self.write_line(&Line::Node(node))
    }

    fn edge(&mut self, edge: &ExportEdge) -> Result<()> {
        self.write_line(&Line::Edge(edge))
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Send every record, and the call edges of `call_graphs`, to `sink`.
///
/// Nodes and edges are deduplicated. Call-graph function names resolve to the
/// `Class.method` id of the first class declaring a method with that name,
/// else to a top-level function of that name, else stay bare.
///
/// # Errors
///
/// Returns the first error reported by the sink.
pub fn export_records(
    records: &[StructuralRecord],
    call_graphs: &[CallGraph],
    sink: &mut dyn GraphSink,
) -> Result<ExportStats> {
    let mut exporter = Exporter {
        sink,
        nodes: BTreeSet::new(),
        edges: BTreeSet::new(),
    };
    let mut method_ids: BTreeMap<&str, String> = BTreeMap::new();

    for record in records {
        exporter.node(ExportNode {
            label: NodeLabel::File,
            id: record.path.clone(),
            name: record.path.clone(),
            file: None,
            line: None,
        })?;

        for class in &record.classes {
            exporter.node(ExportNode {
                label: NodeLabel::Class,
                id: class.name.clone(),
                name: class.name.clone(),
                file: Some(record.path.clone()),
                line: Some(class.line),
            })?;
            exporter.edge(EdgeLabel::Contains, &record.path, &class.name)?;
            if let Some(parent) = &class.parent {
                exporter.edge(EdgeLabel::Extends, &class.name, parent)?;
            }
            for interface in &class.interfaces {
                exporter.edge(EdgeLabel::Implements, &class.name, interface)?;
            }

            for method in &class.methods {
                let id = format!("{}.{}", class.name, method.name);
                exporter.node(ExportNode {
                    label: NodeLabel::Method,
                    id: id.clone(),
                    name: method.name.clone(),
                    file: Some(record.path.clone()),
                    line: Some(method.lines.start),
                })?;
                exporter.edge(EdgeLabel::HasMethod, &class.name, &id)?;
                method_ids.entry(method.name.as_str()).or_insert(id);
            }
        }

        for function in &record.functions {
            exporter.node(ExportNode {
                label: NodeLabel::Method,
                id: function.name.clone(),
                name: function.name.clone(),
                file: Some(record.path.clone()),
                line: Some(function.line),
            })?;
            exporter.edge(EdgeLabel::Contains, &record.path, &function.name)?;
            method_ids
                .entry(function.name.as_str())
                .or_insert_with(|| function.name.clone());
        }
    }

    let resolve = |name: &str| {
        method_ids
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    };
    for graph in call_graphs {
        for (caller, callees) in graph.call_graph() {
            let from = resolve(caller);
            for callee in callees {
                exporter.edge(EdgeLabel::Calls, &from, &resolve(callee))?;
            }
        }
    }

    exporter.sink.finish()?;
    let stats = ExportStats {
        nodes: exporter.nodes.len(),
        edges: exporter.edges.len(),
    };
    debug!(nodes = stats.nodes, edges = stats.edges, "Exported graph");
    Ok(stats)
}

/// Export to a JSON Lines file.
///
/// Output goes to a temporary sibling file that is renamed over `path` once
/// complete, so an interrupted export never leaves a truncated file behind.
/// The temporary file is removed again when writing or renaming fails.
///
/// # Errors
///
/// Returns an error if the file cannot be written or renamed.
pub fn export_to_path(
    path: &Path,
    records: &[StructuralRecord],
    call_graphs: &[CallGraph],
) -> Result<ExportStats> {
    let temp_path = make_temp_path(path);

    let result = write_to_temp_file(&temp_path, records, call_graphs).and_then(|stats| {
        std::fs::rename(&temp_path, path)?;
        Ok(stats)
    });
    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}

/// `graph.jsonl` becomes `graph.jsonl.tmp`; `graph` becomes `graph.tmp`.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let extension = match path.extension() {
        Some(ext) => {
            let mut ext = ext.to_os_string();
            ext.push(".tmp");
            ext
        }
        None => OsString::from("tmp"),
    };
    temp_path.set_extension(extension);
    temp_path
}

fn write_to_temp_file(
    temp_path: &Path,
    records: &[StructuralRecord],
    call_graphs: &[CallGraph],
) -> Result<ExportStats> {
    let mut sink = JsonLinesSink::new(File::create(temp_path)?);
    let stats = export_records(records, call_graphs, &mut sink)?;
    sink.into_inner()?;
    Ok(stats)
}

struct Exporter<'a> {
    sink: &'a mut dyn GraphSink,
    nodes: BTreeSet<(NodeLabel, String)>,
    edges: BTreeSet<ExportEdge>,
}

impl Exporter<'_> {
    fn node(&mut self, node: ExportNode) -> Result<()> {
        if self.nodes.insert((node.label, node.id.clone())) {
            self.sink.node(&node)?;
        }
        Ok(())
    }

    fn edge(&mut self, label: EdgeLabel, from: &str, to: &str) -> Result<()> {
        let edge = ExportEdge {
            label,
            from: from.to_string(),
            to: to.to_string(),
        };
        if !self.edges.contains(&edge) {
            self.sink.edge(&edge)?;
            self.edges.insert(edge);
        }
        Ok(())
    }
}
