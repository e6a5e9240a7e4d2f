//! `ripple impact` command implementation.

use std::path::Path;

use ripple::report::impact_markdown;

use super::display::{print_file_errors, print_impact};
use super::{OutputFormat, open};

/// Run the impact command.
pub fn run(
    root: &Path,
    config: Option<&Path>,
    items: &[String],
    depth: Option<usize>,
    format: OutputFormat,
) -> Result<(), ripple::Error> {
    let ripple = open(root, config)?;
    let analysis = ripple.analyze()?;
    print_file_errors(&analysis.errors);

    let depth = depth.unwrap_or(ripple.config().max_depth);
    let report = analysis.impact(items, depth);
    let limit = ripple.config().report_chain_limit;

    match format {
        OutputFormat::Text => print_impact(&report, limit),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Markdown => print!("{}", impact_markdown(&report, limit)),
    }

    Ok(())
}
