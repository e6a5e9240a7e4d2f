//! Mapping a unified diff onto changed classes and methods.
//!
//! `parse_unified_diff` reads `git diff` output (or any unified diff) into
//! per-file line counts and the new-side line numbers of added lines.
//! `changed_items` turns those line numbers into graph identifiers using a
//! proximity heuristic: a line close enough to a declaration, or inside its
//! known body, marks that declaration as changed.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::types::StructuralRecord;

static HUNK_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@@ -\d+(?:,\d+)? \+(\d+)").expect("hunk pattern is valid"));

/// An added line on the new side of a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedLine {
    /// 1-indexed line number in the new file
    pub line: u32,
    /// Line text without the leading `+`
    pub content: String,
}

/// Changes to one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
    /// Path on the new side (old side for deleted files), prefix stripped
    pub path: String,
    /// Number of added lines
    pub added: usize,
    /// Number of deleted lines
    pub deleted: usize,
    /// Added lines with their new-side line numbers
    pub changed_lines: Vec<ChangedLine>,
}

impl FileDiff {
    fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// New-side line numbers of the added lines.
    #[must_use]
    pub fn line_numbers(&self) -> Vec<u32> {
        self.changed_lines.iter().map(|c| c.line).collect()
    }
}

/// Parse unified diff text into per-file changes.
///
/// Files start at a `diff --git` line or at a `---`/`+++` header pair. Inside
/// a hunk, `+` lines are recorded and advance the new-side counter, context
/// lines advance it, and `-` lines do not.
#[must_use]
pub fn parse_unified_diff(text: &str) -> Vec<FileDiff> {
    let lines: Vec<&str> = text.lines().collect();
    let mut files: Vec<FileDiff> = Vec::new();
    let mut current: Option<FileDiff> = None;
    let mut in_hunk = false;
    let mut new_line: u32 = 0;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        i += 1;

        if let Some(rest) = line.strip_prefix("diff --git ") {
            files.extend(current.take());
            let path = rest.rsplit(' ').next().unwrap_or(rest);
            current = Some(FileDiff::new(strip_side_prefix(path)));
            in_hunk = false;
            continue;
        }

        if let Some(old) = line.strip_prefix("--- ")
            && let Some(new) = lines.get(i).and_then(|l| l.strip_prefix("+++ "))
        {
            i += 1;
            if current.as_ref().is_none_or(|_| in_hunk) {
                files.extend(current.take());
                current = Some(FileDiff::default());
            }
            let path = if new.trim() == "/dev/null" { old } else { new };
            if let Some(file) = current.as_mut() {
                file.path = strip_side_prefix(path.split('\t').next().unwrap_or(path));
            }
            in_hunk = false;
            continue;
        }

        if line.starts_with("@@") {
            if let Some(start) = HUNK_HEADER
                .captures(line)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
            {
                new_line = start;
                in_hunk = true;
            }
            continue;
        }

        let Some(file) = current.as_mut().filter(|_| in_hunk) else {
            continue;
        };
        if let Some(added) = line.strip_prefix('+') {
            file.added += 1;
            file.changed_lines.push(ChangedLine {
                line: new_line,
                content: added.to_string(),
            });
            new_line += 1;
        } else if line.starts_with('-') {
            file.deleted += 1;
        } else if !line.starts_with('\\') {
            new_line += 1;
        }
    }

    files.extend(current);
    debug!(files = files.len(), "Parsed unified diff");
    files
}

fn strip_side_prefix(path: &str) -> String {
    let path = path.trim();
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
        .to_string()
}

/// Identifiers of the declarations touched by `lines` in one file.
///
/// Yields, in order and without duplicates:
///
/// - the file path, when any line changed
/// - each class whose declaration is within `class-proximity` lines of a
///   changed line, or whose known body contains it (bare class name)
/// - each method of such a class whose declaration is within
///   `method-proximity` lines, or whose body contains it (`Class.method`)
#[must_use]
pub fn changed_items(
    record: &StructuralRecord,
    lines: &[u32],
    config: &AnalysisConfig,
) -> Vec<String> {
    if lines.is_empty() {
        return Vec::new();
    }

    let mut items = vec![record.path.clone()];
    let mut seen: BTreeSet<String> = items.iter().cloned().collect();
    let mut push = |item: String, items: &mut Vec<String>| {
        if seen.insert(item.clone()) {
            items.push(item);
        }
    };

    for class in &record.classes {
        let body_contains =
            |line: u32| class.end_line.is_some_and(|end| (class.line..=end).contains(&line));
        let class_hit = lines
            .iter()
            .any(|&l| class.line.abs_diff(l) < config.class_proximity || body_contains(l));
        if !class_hit {
            continue;
        }
        push(class.name.clone(), &mut items);

        for method in &class.methods {
            let method_hit = lines.iter().any(|&l| {
                method.lines.start.abs_diff(l) < config.method_proximity || method.lines.contains(l)
            });
            if method_hit {
                push(format!("{}.{}", class.name, method.name), &mut items);
            }
        }
    }

    items
}

/// Changed identifiers for every file of a diff that has a matching record.
///
/// A record matches when its path ends with the diff path, so records
/// collected under a project root match repository-relative diff paths.
#[must_use]
pub fn changed_items_from_diff(
    diffs: &[FileDiff],
    records: &[StructuralRecord],
    config: &AnalysisConfig,
) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut items = Vec::new();

    for diff in diffs {
        let Some(record) = records
            .iter()
            .find(|r| Path::new(&r.path).ends_with(&diff.path))
        else {
            debug!(file = %diff.path, "No structural record for changed file");
            continue;
        };
        for item in changed_items(record, &diff.line_numbers(), config) {
            if seen.insert(item.clone()) {
                items.push(item);
            }
        }
    }

    items
}
