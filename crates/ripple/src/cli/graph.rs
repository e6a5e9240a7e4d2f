//! `ripple graph` command implementation.

use std::path::Path;

use colored::Colorize;
use serde_json::json;

use super::display::{print_cycles, print_file_errors};
use super::{OutputFormat, open};

/// Run the graph command.
pub fn run(root: &Path, config: Option<&Path>, format: OutputFormat) -> Result<(), ripple::Error> {
    let ripple = open(root, config)?;
    let analysis = ripple.analyze()?;
    print_file_errors(&analysis.errors);

    let graph = &analysis.graph;
    let cycles = graph.cycles();
    let call_cycles = analysis.merged_call_graph().cycles();

    match format {
        OutputFormat::Json => {
            let value = json!({
                "files": analysis.records.len(),
                "nodes": graph.node_count(),
                "edges": graph.edge_count(),
                "graph": graph,
                "cycles": cycles,
                "callCycles": call_cycles,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Markdown => {
            println!("# Dependency Graph\n");
            println!("- **Files**: {}", analysis.records.len());
            println!("- **Nodes**: {}", graph.node_count());
            println!("- **Edges**: {}", graph.edge_count());
            println!("- **Inheritance edges**: {}", edge_total(graph.inheritance()));
            println!(
                "- **Implementation edges**: {}",
                edge_total(graph.implementations())
            );
            println!("\n## Cycles\n");
            for cycle in &cycles {
                println!("- {}", cycle.members.join(" → "));
            }
        }
        OutputFormat::Text => {
            println!("Dependency graph of {}:", root.display().to_string().cyan().bold());
            println!();
            println!(
                "  {} {}",
                "Files:".white().bold(),
                analysis.records.len().to_string().green()
            );
            println!(
                "  {} {}",
                "Nodes:".white().bold(),
                graph.node_count().to_string().green()
            );
            println!(
                "  {} {} ({} inheritance, {} implementation)",
                "Edges:".white().bold(),
                graph.edge_count().to_string().green(),
                edge_total(graph.inheritance()),
                edge_total(graph.implementations())
            );
            println!();
            println!("{}", "Dependency cycles".white().bold());
            print_cycles(&cycles);
            println!();
            println!("{}", "Call cycles".white().bold());
            print_cycles(&call_cycles);

            if !analysis.skipped_dirs.is_empty() {
                println!();
                println!("{}", "Skipped directories".white().bold());
                for (dir, reason) in &analysis.skipped_dirs {
                    println!("  {} {}: {}", "•".dimmed(), dir.display(), reason.dimmed());
                }
            }
        }
    }

    Ok(())
}

fn edge_total(map: &ripple::graph::EdgeMap) -> usize {
    map.values().map(std::collections::BTreeSet::len).sum()
}
