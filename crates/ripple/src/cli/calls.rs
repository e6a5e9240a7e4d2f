//! `ripple calls` command implementation.

use std::path::Path;

use colored::Colorize;
use ripple::CallGraph;
use ripple::report::{call_chain_markdown, mermaid};

use super::display::print_cycles;
use super::open;

/// Options of the calls command.
pub struct CallsOptions {
    /// Function to trace chains from and to
    pub function: Option<String>,
    /// Chain depth override
    pub depth: Option<usize>,
    /// Print a Mermaid diagram
    pub mermaid: bool,
    /// Print the Markdown report
    pub report: bool,
}

/// Run the calls command.
pub fn run(
    root: &Path,
    config: Option<&Path>,
    file: &Path,
    options: &CallsOptions,
) -> Result<(), ripple::Error> {
    let ripple = open(root, config)?;
    let graph = ripple.call_graph(file)?;
    let settings = ripple.config();

    if options.mermaid {
        print!("{}", mermaid(&graph));
        return Ok(());
    }
    if options.report {
        let depth = options.depth.unwrap_or(settings.call_chain_report_depth);
        print!(
            "{}",
            call_chain_markdown(&graph, depth, settings.report_chain_limit)
        );
        return Ok(());
    }

    let depth = options.depth.unwrap_or(settings.max_depth);
    match &options.function {
        Some(name) => print_function(&graph, name, depth, settings.report_chain_limit),
        None => print_summary(&graph, file),
    }
    Ok(())
}

fn print_summary(graph: &CallGraph, file: &Path) {
    println!("Call graph of {}:", file.display().to_string().cyan().bold());
    println!();
    println!(
        "  {} {}",
        "Functions:".white().bold(),
        graph.functions().len().to_string().green()
    );
    println!(
        "  {} {}",
        "Call edges:".white().bold(),
        graph.edge_count().to_string().green()
    );
    println!(
        "  {} {}",
        "Entry functions:".white().bold(),
        graph.entry_functions().join(", ")
    );
    println!(
        "  {} {}",
        "Leaf functions:".white().bold(),
        graph.leaf_functions().join(", ")
    );
    println!();
    print_cycles(&graph.cycles());
}

fn print_function(graph: &CallGraph, name: &str, depth: usize, limit: usize) {
    match graph.function(name) {
        Some(function) => println!(
            "{} ({}:{}-{})",
            function.signature.cyan().bold(),
            function.file,
            function.lines.start,
            function.lines.end
        ),
        None => println!(
            "{} {}",
            name.cyan().bold(),
            "(not defined in this file)".dimmed()
        ),
    }

    for (heading, chains) in [
        ("Calls", graph.call_chain(name, depth)),
        ("Called from", graph.reverse_call_chain(name, depth)),
    ] {
        println!();
        println!(
            "  {} ({} chains):",
            heading.white().bold(),
            chains.len().to_string().green()
        );
        for chain in chains.iter().take(limit) {
            println!("    {} {}", "•".dimmed(), chain.join(" → "));
        }
        if chains.len() > limit {
            println!("    {} ... and {} more", "•".dimmed(), chains.len() - limit);
        }
    }
}
