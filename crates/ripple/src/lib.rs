//! # Ripple: Static Dependency and Change-Impact Tracing
//!
//! Ripple extracts structural facts from Java and Python sources, folds them
//! into bidirectional dependency graphs, and traces what a change ripples
//! into ("who depends on me") and what it rests on ("what do I depend on").
//!
//! ## Design Philosophy
//!
//! - **Best-effort extraction** - Java is scanned with patterns, Python walked with tree-sitter
//! - **Graphs are values** - every build starts empty and is handed back to the caller
//! - **Failures stay local** - a bad file yields an error entry and an empty record, never an abort
//! - **Two traversal policies** - visited-once for impact, per-path cycle marking for call chains
//! - **Library first** - the `ripple` binary is a thin layer over this crate
//!
//! ## Quick Start
//!
//! ```no_run
//! use ripple::Ripple;
//! use std::path::Path;
//!
//! let ripple = Ripple::new(Path::new("/path/to/project"))?;
//! let analysis = ripple.analyze()?;
//! println!("{} files, {} edges", analysis.records.len(), analysis.graph.edge_count());
//!
//! let report = analysis.impact(&["UserService".to_string()], ripple.config().max_depth);
//! println!("{} affected", report.total_affected);
//! # Ok::<(), ripple::Error>(())
//! ```

pub mod callchain;
pub mod changes;
pub mod config;
pub mod discover;
mod error;
pub mod export;
pub mod extract;
pub mod graph;
pub mod impact;
mod lexical;
pub mod report;
mod types;

pub use callchain::{CallChain, CallGraph, FunctionBody, build_call_graph};
pub use config::AnalysisConfig;
pub use error::{Error, FileError, FileErrorKind, ParseError, Result};
pub use graph::{Cycle, DependencyGraph};
pub use impact::{Direction, ImpactChain, ImpactReport, trace_impact};
pub use types::{
    ClassKind, ClassRecord, FunctionRecord, Language, LineRange, MethodRecord, StructuralRecord,
};

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use extract::{SourceFile, extract_batch};

/// Everything one analysis run produced.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// One structural record per readable source file, sorted by path
    pub records: Vec<StructuralRecord>,
    /// One call graph per readable source file, in the same order
    pub call_graphs: Vec<CallGraph>,
    /// Dependency graph over all records
    pub graph: DependencyGraph,
    /// Files that could not be read or parsed
    pub errors: Vec<FileError>,
    /// Directories discovery could not enter
    pub skipped_dirs: Vec<(PathBuf, String)>,
}

impl Analysis {
    /// Trace the impact of `items` through the dependency graph.
    #[must_use]
    pub fn impact(&self, items: &[String], max_depth: usize) -> ImpactReport {
        trace_impact(&self.graph, items, max_depth)
    }

    /// Record for a file, matched by path suffix.
    #[must_use]
    pub fn record(&self, path: &Path) -> Option<&StructuralRecord> {
        self.records
            .iter()
            .find(|r| Path::new(&r.path).ends_with(path))
    }

    /// Every call graph merged into one.
    ///
    /// Functions are keyed by bare name, so same-named functions from
    /// different files share a node.
    #[must_use]
    pub fn merged_call_graph(&self) -> CallGraph {
        let mut merged = CallGraph::new();
        for graph in &self.call_graphs {
            merged.merge(graph);
        }
        merged
    }
}

/// Analysis entry point for one project root.
#[derive(Debug, Clone)]
pub struct Ripple {
    root: PathBuf,
    config: AnalysisConfig,
}

impl Ripple {
    /// Open a project, loading `<root>/.ripple.yaml` when present.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but is invalid.
    pub fn new(root: &Path) -> Result<Self> {
        let config = AnalysisConfig::discover(root)?;
        Self::with_config(root, config)
    }

    /// Open a project with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration fails validation.
    pub fn with_config(root: &Path, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Discover, read and extract every source file, then build the graphs.
    ///
    /// Per-file problems are collected in `Analysis::errors`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the root cannot be walked at all.
    pub fn analyze(&self) -> Result<Analysis> {
        let start = Instant::now();
        let discovery = discover::discover_sources(&self.root, &self.config)?;

        let mut errors = Vec::new();
        let mut sources = Vec::with_capacity(discovery.files.len());
        for path in discovery.files {
            match SourceFile::read(path) {
                Ok(source) => sources.push(source),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable source file");
                    errors.push(e);
                }
            }
        }

        let batch = extract_batch(&sources);
        errors.extend(batch.errors);

        let call_graphs: Vec<CallGraph> = sources
            .par_iter()
            .map(|s| build_call_graph(&s.content, &s.path_str(), s.language))
            .collect();

        let graph = DependencyGraph::build_parallel(&batch.records);

        info!(
            files = sources.len(),
            failed = errors.len(),
            edges = graph.edge_count(),
            elapsed_ms = start.elapsed().as_millis(),
            "Analysis complete"
        );

        Ok(Analysis {
            records: batch.records,
            call_graphs,
            graph,
            errors,
            skipped_dirs: discovery.skipped_dirs,
        })
    }

    /// Build the call graph of a single file.
    ///
    /// # Errors
    ///
    /// Returns `Error::File` for unsupported or unreadable files.
    pub fn call_graph(&self, path: &Path) -> Result<CallGraph> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let source = SourceFile::read(path)?;
        Ok(CallGraph::build(
            &source.content,
            &source.path_str(),
            source.language,
        ))
    }
}
