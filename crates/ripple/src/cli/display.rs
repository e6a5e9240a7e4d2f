//! Common display utilities for CLI commands.

use colored::Colorize;
use ripple::{Cycle, Direction, FileError, ImpactReport};

/// Print the chains of one item in one direction, at most `limit` of them.
pub fn print_chains(report: &ImpactReport, item: &str, direction: Direction, limit: usize) {
    let chains = report.chains(item, direction);
    let heading = match direction {
        Direction::Upstream => "Upstream (affected by this change)",
        Direction::Downstream => "Downstream (relied on by this item)",
    };
    println!(
        "  {} ({} chains):",
        heading.white().bold(),
        chains.len().to_string().green()
    );

    for chain in chains.iter().take(limit) {
        println!("    {} {}", "•".dimmed(), chain.render(direction));
    }
    if chains.len() > limit {
        println!("    {} ... and {} more", "•".dimmed(), chains.len() - limit);
    }
}

/// Print a full impact report for the terminal.
pub fn print_impact(report: &ImpactReport, limit: usize) {
    for item in &report.changed_items {
        println!();
        println!("Impact of {}:", item.cyan().bold());
        if report.unknown_roots.contains(item) {
            println!("  {}", "(not found in the dependency graph)".dimmed());
        }
        print_chains(report, item, Direction::Upstream, limit);
        print_chains(report, item, Direction::Downstream, limit);
    }

    println!();
    println!(
        "{} {} across {} changed items (depth {})",
        "Total affected:".white().bold(),
        report.total_affected.to_string().yellow(),
        report.changed_items.len(),
        report.max_depth
    );
}

/// Print cycles as `a → b → a`.
pub fn print_cycles(cycles: &[Cycle]) {
    if cycles.is_empty() {
        println!("{}", "No cycles detected.".green());
        return;
    }

    println!("Found {} cycles:", cycles.len().to_string().red().bold());
    for (i, cycle) in cycles.iter().enumerate() {
        let mut path = cycle.members.join(" → ");
        if let Some(first) = cycle.members.first() {
            path.push_str(" → ");
            path.push_str(first);
        }
        println!("  {} {}: {}", "Cycle".yellow().bold(), i + 1, path.dimmed());
    }
}

/// Warn about files that could not be analyzed.
pub fn print_file_errors(errors: &[FileError]) {
    if errors.is_empty() {
        return;
    }
    eprintln!(
        "{}: {} files could not be analyzed",
        "warning".yellow(),
        errors.len()
    );
    for error in errors {
        let bullet = if error.kind.is_internal_error() {
            "•".red()
        } else {
            "•".dimmed()
        };
        eprintln!("  {bullet} {error}");
    }
}
