//! `ripple diff` command implementation.

use std::path::Path;

use colored::Colorize;
use ripple::changes::{changed_items_from_diff, parse_unified_diff};
use ripple::report::impact_markdown;

use super::display::{print_file_errors, print_impact};
use super::{OutputFormat, open};

/// Run the diff command.
pub fn run(
    root: &Path,
    config: Option<&Path>,
    patch: &Path,
    depth: Option<usize>,
    format: OutputFormat,
) -> Result<(), ripple::Error> {
    let text = if patch == Path::new("-") {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(patch)?
    };

    let ripple = open(root, config)?;
    let analysis = ripple.analyze()?;
    print_file_errors(&analysis.errors);

    let diffs = parse_unified_diff(&text);
    let items = changed_items_from_diff(&diffs, &analysis.records, ripple.config());
    let depth = depth.unwrap_or(ripple.config().max_depth);
    let report = analysis.impact(&items, depth);
    let limit = ripple.config().report_chain_limit;

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({ "files": diffs, "impact": report });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Markdown => print!("{}", impact_markdown(&report, limit)),
        OutputFormat::Text => {
            println!("{}", "Changed files".white().bold());
            for diff in &diffs {
                println!(
                    "  {} {} ({}, {})",
                    "•".dimmed(),
                    diff.path,
                    format!("+{}", diff.added).green(),
                    format!("-{}", diff.deleted).red()
                );
            }
            if items.is_empty() {
                println!();
                println!("{}", "No analyzed declarations were touched.".dimmed());
                return Ok(());
            }
            print_impact(&report, limit);
        }
    }

    Ok(())
}
