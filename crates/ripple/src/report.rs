//! Markdown and Mermaid rendering of analysis results.
//!
//! Chain lists are truncated here, at presentation time. The structured
//! results keep every chain.

use std::fmt::Write as _;

use crate::callchain::CallGraph;
use crate::impact::{Direction, ImpactReport};

/// Render an impact report as Markdown, listing at most `limit` chains per
/// item and direction.
#[must_use]
pub fn impact_markdown(report: &ImpactReport, limit: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Change Impact Report\n");
    let _ = writeln!(out, "**Changed items**: {}", report.changed_items.len());
    let _ = writeln!(out, "**Total affected**: {}", report.total_affected);
    let _ = writeln!(out, "**Max depth**: {}\n", report.max_depth);

    let _ = writeln!(out, "## Changed Items\n");
    for item in &report.changed_items {
        let _ = writeln!(out, "- `{item}`");
    }

    if !report.unknown_roots.is_empty() {
        let _ = writeln!(out, "\n## Not Found In Graph\n");
        for item in &report.unknown_roots {
            let _ = writeln!(out, "- `{item}`");
        }
    }

    let _ = writeln!(out, "\n## Impact Chains\n");
    for item in &report.changed_items {
        let _ = writeln!(out, "### Change: `{item}`\n");
        write_chains(
            &mut out,
            report,
            item,
            Direction::Upstream,
            "**Upstream impact** (what is affected):",
            limit,
        );
        write_chains(
            &mut out,
            report,
            item,
            Direction::Downstream,
            "**Downstream impact** (what it relies on):",
            limit,
        );
    }

    out
}

fn write_chains(
    out: &mut String,
    report: &ImpactReport,
    item: &str,
    direction: Direction,
    heading: &str,
    limit: usize,
) {
    let chains = report.chains(item, direction);
    if chains.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}");
    for (i, chain) in chains.iter().take(limit).enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, chain.render(direction));
    }
    if chains.len() > limit {
        let _ = writeln!(out, "... and {} more", chains.len() - limit);
    }
    out.push('\n');
}

/// Render a call graph as a Markdown call-chain report.
///
/// Lists entry and leaf functions, then every function with its callees, up
/// to `limit` call chains of depth `depth`, and its callers.
#[must_use]
pub fn call_chain_markdown(graph: &CallGraph, depth: usize, limit: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Call Chain Report\n");
    if let Some(language) = graph.language() {
        let _ = writeln!(out, "**Language**: {language}");
    }
    let _ = writeln!(out, "**Functions**: {}", graph.functions().len());
    let _ = writeln!(out, "**Call edges**: {}\n", graph.edge_count());

    let _ = writeln!(out, "## Statistics\n");
    let entries = graph.entry_functions();
    let _ = writeln!(out, "- **Entry functions** (never called): {}", entries.len());
    for name in entries {
        let _ = writeln!(out, "  - `{name}`");
    }
    let leaves = graph.leaf_functions();
    let _ = writeln!(out, "- **Leaf functions** (call nothing): {}", leaves.len());
    for name in leaves {
        let _ = writeln!(out, "  - `{name}`");
    }

    let cycles = graph.cycles();
    if !cycles.is_empty() {
        let _ = writeln!(out, "- **Recursive groups**: {}", cycles.len());
        for cycle in cycles {
            let _ = writeln!(out, "  - {}", cycle.members.join(", "));
        }
    }

    let _ = writeln!(out, "\n## Call Chains");
    for (name, function) in graph.functions() {
        let _ = writeln!(out, "\n### `{}`\n", function.signature);
        let _ = writeln!(out, "- **File**: `{}`", function.file);
        let _ = writeln!(
            out,
            "- **Lines**: {}-{}",
            function.lines.start, function.lines.end
        );

        if let Some(callees) = graph.callees_of(name) {
            let _ = writeln!(out, "- **Calls**: {}", code_list(callees));
            let chains = graph.call_chain(name, depth);
            let _ = writeln!(out, "- **Call chains** (depth {depth}):");
            for (i, chain) in chains.iter().take(limit).enumerate() {
                let _ = writeln!(out, "  {}. {}", i + 1, chain.join(" → "));
            }
        }
        if let Some(callers) = graph.callers_of(name) {
            let _ = writeln!(out, "- **Called by**: {}", code_list(callers));
        }
    }

    out
}

fn code_list<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    names
        .into_iter()
        .map(|n| format!("`{n}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a call graph as a fenced Mermaid `graph TD` diagram, one line per
/// edge in sorted order.
#[must_use]
pub fn mermaid(graph: &CallGraph) -> String {
    let mut out = String::from("```mermaid\ngraph TD\n");
    for (caller, callees) in graph.call_graph() {
        for callee in callees {
            let _ = writeln!(
                out,
                "    {}[{caller}] --> {}[{callee}]",
                mermaid_id(caller),
                mermaid_id(callee)
            );
        }
    }
    out.push_str("```\n");
    out
}

/// Node ids must be plain words; dotted names become underscored.
fn mermaid_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DependencyGraph;
    use crate::impact::trace_impact;
    use crate::types::Language;

    fn impact_fixture() -> ImpactReport {
        let mut graph = DependencyGraph::new();
        for dependent in ["A", "B", "C", "D", "E", "F"] {
            graph.add_dependency(dependent, "Core");
        }
        graph.add_dependency("Core", "Util");
        trace_impact(&graph, &["Core".to_string(), "Ghost".to_string()], 5)
    }

    #[test]
    fn impact_markdown_truncates_to_limit() {
        let text = impact_markdown(&impact_fixture(), 5);

        assert!(text.contains("**Changed items**: 2"));
        assert!(text.contains("**Total affected**: 9"));
        assert!(text.contains("1. Core ← A"));
        assert!(text.contains("5. Core ← E"));
        assert!(!text.contains("Core ← F"));
        assert!(text.contains("... and 1 more"));
        assert!(text.contains("1. Core → Util"));
    }

    #[test]
    fn impact_markdown_lists_unknown_roots() {
        let text = impact_markdown(&impact_fixture(), 3);

        assert!(text.contains("## Not Found In Graph"));
        assert!(text.contains("- `Ghost`"));
        assert!(text.contains("### Change: `Ghost`"));
    }

    const SOURCE: &str = "def main():\n    load()\n    save()\n\ndef load():\n    parse()\n\ndef save():\n    pass\n";

    #[test]
    fn call_chain_markdown_lists_statistics_and_chains() {
        let graph = CallGraph::build(SOURCE, "app.py", Language::Python);
        let text = call_chain_markdown(&graph, 3, 5);

        assert!(text.contains("**Language**: Python"));
        assert!(text.contains("**Functions**: 3"));
        assert!(text.contains("**Call edges**: 3"));
        assert!(text.contains("- **Entry functions** (never called): 1\n  - `main`"));
        assert!(text.contains("- **Leaf functions** (call nothing): 1\n  - `save`"));
        assert!(text.contains("### `def main()`"));
        assert!(text.contains("- **Calls**: `load`, `save`"));
        assert!(text.contains("  1. main → load → parse"));
        assert!(text.contains("- **Called by**: `main`"));
    }

    #[test]
    fn mermaid_emits_sorted_edges() {
        let graph = CallGraph::build(SOURCE, "app.py", Language::Python);

        assert_eq!(
            mermaid(&graph),
            "```mermaid\ngraph TD\n    load[load] --> parse[parse]\n    main[main] --> load[load]\n    main[main] --> save[save]\n```\n"
        );
    }

    #[test]
    fn mermaid_ids_are_sanitized() {
        assert_eq!(mermaid_id("self.save"), "self_save");
    }
}
