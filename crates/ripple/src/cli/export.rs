//! `ripple export` command implementation.

use std::path::Path;

use colored::Colorize;
use ripple::export::export_to_path;

use super::display::print_file_errors;
use super::open;

/// Run the export command.
pub fn run(root: &Path, config: Option<&Path>, output: &Path) -> Result<(), ripple::Error> {
    let ripple = open(root, config)?;
    let analysis = ripple.analyze()?;
    print_file_errors(&analysis.errors);

    let stats = export_to_path(output, &analysis.records, &analysis.call_graphs)?;

    println!(
        "Exported {} nodes and {} edges to {}",
        stats.nodes.to_string().green(),
        stats.edges.to_string().green(),
        output.display().to_string().cyan()
    );
    Ok(())
}
