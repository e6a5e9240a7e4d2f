//! Lexical helpers shared by the Java scanner and the call-chain extractor.
//!
//! Nothing here understands strings, comments or scopes. Braces inside string
//! literals count as braces and parenthesized words inside comments count as
//! calls. Callers accept that imprecision in exchange for not needing a
//! grammar.

// Line numbers are stored as u32; no practical source file exceeds that.
#![allow(clippy::cast_possible_truncation)]

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Language;

/// An identifier immediately followed by `(`, preceded by a non-identifier
/// character or the start of the text.
static CALL_SITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w])(\w+)\s*\(").expect("call-site pattern is valid"));

/// Words followed by `(` in Java that are never method calls.
const JAVA_CALL_STOPLIST: &[&str] = &[
    "if", "for", "while", "switch", "catch", "new", "return", "synchronized", "throw",
];

/// Words followed by `(` in Python that are keywords or common builtins.
const PYTHON_CALL_STOPLIST: &[&str] = &[
    "if", "elif", "for", "while", "with", "return", "not", "and", "or", "in", "assert",
    "print", "len", "range", "str", "int", "list", "dict",
];

/// Keywords excluded from call-site scanning for `language`.
#[must_use]
pub fn call_stoplist(language: Language) -> &'static [&'static str] {
    match language {
        Language::Java => JAVA_CALL_STOPLIST,
        Language::Python => PYTHON_CALL_STOPLIST,
    }
}

/// Scan `text` for call sites, in order of appearance, duplicates kept.
///
/// A call site is `name(` where `name` is not preceded by another identifier
/// character. Member calls (`obj.save(`) report the member name (`save`).
#[must_use]
pub fn scan_call_sites(text: &str, language: Language) -> Vec<String> {
    let stoplist = call_stoplist(language);
    let mut calls = Vec::new();
    let mut pos = 0;

    // `captures_iter` would skip call sites whose leading delimiter was
    // consumed by the previous match (`a(b(`), so restart after each name.
    while let Some(caps) = CALL_SITE.captures_at(text, pos) {
        let Some(name) = caps.get(1) else { break };
        pos = name.end();
        let word = name.as_str();
        if word.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            continue;
        }
        if !stoplist.contains(&word) {
            calls.push(word.to_string());
        }
    }

    calls
}

/// 1-indexed line number of a byte offset in `text`.
#[must_use]
pub fn line_of_offset(text: &str, offset: usize) -> u32 {
    let offset = offset.min(text.len());
    text.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count() as u32
        + 1
}

/// Find the last line of a brace-delimited block.
///
/// Starts counting at `lines[start]` (0-indexed). The counter only arms once
/// the first `{` is seen; the block ends on the line where it returns to zero.
///
/// # Returns
///
/// The 1-indexed line of the closing brace, or `lines.len()` when the block
/// never closes.
#[must_use]
pub fn brace_block_end(lines: &[&str], start: usize) -> usize {
    let mut depth: i64 = 0;
    let mut opened = false;

    for (i, line) in lines.iter().enumerate().skip(start) {
        for ch in line.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => {
                    depth -= 1;
                    if opened && depth == 0 {
                        return i + 1;
                    }
                }
                _ => {}
            }
        }
    }

    lines.len()
}

/// Find the last line of an indentation-delimited block (Python `def`).
///
/// The block headed by `lines[start]` (0-indexed) ends before the first later
/// line that is neither blank nor a comment and is indented no deeper than the
/// header.
///
/// # Returns
///
/// The 1-indexed last line of the block, or `lines.len()` at end of file.
#[must_use]
pub fn indented_block_end(lines: &[&str], start: usize) -> usize {
    let Some(header) = lines.get(start) else {
        return lines.len();
    };
    let base = indentation(header);

    for (i, line) in lines.iter().enumerate().skip(start + 1) {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }
        if indentation(line) <= base {
            return i;
        }
    }

    lines.len()
}

/// Width of a line's leading whitespace, in characters.
#[must_use]
pub fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Net brace depth change of a line (`{` minus `}`).
#[must_use]
pub fn brace_delta(line: &str) -> i64 {
    line.chars().fold(0, |acc, ch| match ch {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_plain_and_member_calls_in_order() {
        let calls = scan_call_sites("validate(user);\nrepo.save(user);", Language::Java);
        assert_eq!(calls, vec!["validate", "save"]);
    }

    #[test]
    fn keeps_duplicates() {
        let calls = scan_call_sites("log(a); log(b);", Language::Java);
        assert_eq!(calls, vec!["log", "log"]);
    }

    #[test]
    fn skips_java_control_flow() {
        let calls = scan_call_sites(
            "if (ok) { for (x : xs) { process(x); } } return (value);",
            Language::Java,
        );
        assert_eq!(calls, vec!["process"]);
    }

    #[test]
    fn skips_python_keywords_and_builtins() {
        let calls = scan_call_sites("if len(items):\n    print(total(items))", Language::Python);
        assert_eq!(calls, vec!["total"]);
    }

    #[test]
    fn finds_nested_calls_sharing_delimiters() {
        let calls = scan_call_sites("outer(inner(x))", Language::Java);
        assert_eq!(calls, vec!["outer", "inner"]);
    }

    #[test]
    fn ignores_numeric_literals_before_parens() {
        let calls = scan_call_sites("x = 3 (y)", Language::Python);
        assert!(calls.is_empty());
    }

    #[test]
    fn line_of_offset_counts_newlines() {
        let text = "a\nb\nc";
        assert_eq!(line_of_offset(text, 0), 1);
        assert_eq!(line_of_offset(text, 2), 2);
        assert_eq!(line_of_offset(text, 4), 3);
        assert_eq!(line_of_offset(text, 100), 3);
    }

    #[test]
    fn brace_block_end_matches_closing_brace() {
        let lines = vec![
            "void a() {",
            "    if (x) {",
            "        b();",
            "    }",
            "}",
            "void c() {}",
        ];
        assert_eq!(brace_block_end(&lines, 0), 5);
        assert_eq!(brace_block_end(&lines, 5), 6);
    }

    #[test]
    fn brace_block_end_waits_for_opening_brace() {
        let lines = vec!["void a()", "{", "}"];
        assert_eq!(brace_block_end(&lines, 0), 3);
    }

    #[test]
    fn brace_block_end_unclosed_runs_to_eof() {
        let lines = vec!["void a() {", "  b();"];
        assert_eq!(brace_block_end(&lines, 0), 2);
    }

    #[test]
    fn indented_block_end_skips_blank_and_comment_lines() {
        let lines = vec![
            "def a():",
            "    x = 1",
            "",
            "# not part of the dedent check",
            "    return x",
            "def b():",
            "    pass",
        ];
        assert_eq!(indented_block_end(&lines, 0), 5);
        assert_eq!(indented_block_end(&lines, 5), 7);
    }

    #[test]
    fn brace_delta_counts_both_directions() {
        assert_eq!(brace_delta("} else {"), 0);
        assert_eq!(brace_delta("class A {"), 1);
        assert_eq!(brace_delta("}}"), -2);
    }
}
