//! CLI command implementations.

mod display;

pub mod calls;
pub mod diff;
pub mod export;
pub mod graph;
pub mod impact;

use std::path::Path;

use ripple::{AnalysisConfig, Ripple};

/// How a command prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output
    Text,
    /// Pretty-printed JSON
    Json,
    /// Markdown report
    Markdown,
}

/// Open the project at `root`, using `config` instead of `.ripple.yaml` when
/// given.
fn open(root: &Path, config: Option<&Path>) -> Result<Ripple, ripple::Error> {
    match config {
        Some(path) => Ripple::with_config(root, AnalysisConfig::load(path)?),
        None => Ripple::new(root),
    }
}
