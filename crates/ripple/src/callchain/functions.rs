//! Function boundary detection for the call-chain extractor.
//!
//! - Java: a function starts at a method-declaration line that opens a brace
//!   and ends where the brace counter, armed at that brace, returns to zero.
//! - Python: a function starts at a `def` line and ends before the first later
//!   code line indented no deeper than the `def`.

// Line numbers are stored as u32; no practical source file exceeds that.
#![allow(clippy::cast_possible_truncation)]

use std::sync::LazyLock;

use regex::{Match, Regex};
use serde::Serialize;

use crate::extract::java::split_parameters;
use crate::lexical::{brace_block_end, indented_block_end, line_of_offset, scan_call_sites};
use crate::types::{Language, LineRange};

static JAVA_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^[ \t]*",
        r"(?:(?:public|private|protected|static|final|abstract|synchronized|native|default)\s+)*",
        r"(\w+(?:<[^>]+>)?(?:\[\])*)\s+(\w+)\s*\(([^)]*)\)\s*",
        r"(?:throws\s+[\w\s,.]+)?\{",
    ))
    .expect("java function pattern is valid")
});

static PYTHON_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:async\s+)?def\s+(\w+)\s*\(([^)]*)\)\s*(?:->\s*([^:]+))?\s*:")
        .expect("python function pattern is valid")
});

/// Words that fill the return-type or name slot of a statement that merely
/// looks like a method declaration (`else if (x) {`, `return cast(y) {`).
const JAVA_NON_DECLARATIONS: &[&str] = &[
    "else", "if", "for", "while", "switch", "catch", "new", "return", "throw", "synchronized",
    "try", "do",
];

/// One function found in a file, with its source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionBody {
    /// Function name
    pub name: String,
    /// `ReturnType name(params)` for Java, `def name(params)` for Python
    pub signature: String,
    /// Declared return type, if any
    pub return_type: Option<String>,
    /// Raw parameter strings
    pub parameters: Vec<String>,
    /// Lines from the declaration to the end of the body
    pub lines: LineRange,
    /// Source text of those lines
    pub code: String,
    /// File the function was found in
    pub file: String,
    /// Call sites in the body after the signature, duplicates removed, in
    /// order of first appearance
    pub calls: Vec<String>,
}

/// Find every function in `content`, in file order.
#[must_use]
pub fn extract_functions(content: &str, path: &str, language: Language) -> Vec<FunctionBody> {
    let lines: Vec<&str> = content.split('\n').collect();
    let line_starts = line_starts(content);

    let mut functions = Vec::new();
    match language {
        Language::Java => {
            for caps in JAVA_FUNCTION.captures_iter(content) {
                let (Some(whole), Some(ret), Some(name), Some(params)) =
                    (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
                else {
                    continue;
                };
                if JAVA_NON_DECLARATIONS.contains(&ret.as_str())
                    || JAVA_NON_DECLARATIONS.contains(&name.as_str())
                {
                    continue;
                }
                let start = line_of_offset(content, whole.start()) as usize;
                let end = brace_block_end(&lines, start - 1).max(start);
                functions.push(FunctionBody {
                    name: name.as_str().to_string(),
                    signature: format!("{} {}({})", ret.as_str(), name.as_str(), params.as_str()),
                    return_type: Some(ret.as_str().to_string()),
                    parameters: split_parameters(params.as_str()),
                    lines: LineRange::new(start as u32, end as u32),
                    code: lines[start - 1..end].join("\n"),
                    file: path.to_string(),
                    calls: body_calls(content, &line_starts, whole, end, language),
                });
            }
        }
        Language::Python => {
            for caps in PYTHON_FUNCTION.captures_iter(content) {
                let (Some(whole), Some(name), Some(params)) = (caps.get(0), caps.get(1), caps.get(2))
                else {
                    continue;
                };
                let start = line_of_offset(content, whole.start()) as usize;
                let end = indented_block_end(&lines, start - 1).max(start);
                functions.push(FunctionBody {
                    name: name.as_str().to_string(),
                    signature: format!("def {}({})", name.as_str(), params.as_str()),
                    return_type: caps.get(3).map(|t| t.as_str().trim().to_string()),
                    parameters: params
                        .as_str()
                        .split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect(),
                    lines: LineRange::new(start as u32, end as u32),
                    code: lines[start - 1..end].join("\n"),
                    file: path.to_string(),
                    calls: body_calls(content, &line_starts, whole, end, language),
                });
            }
        }
    }

    functions
}

/// Byte offset at which each line begins.
fn line_starts(content: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(content.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

/// Call sites between the end of the signature and the end of `end_line`.
fn body_calls(
    content: &str,
    line_starts: &[usize],
    signature: Match<'_>,
    end_line: usize,
    language: Language,
) -> Vec<String> {
    let body_end = line_starts.get(end_line).copied().unwrap_or(content.len());
    let body_start = signature.end().min(body_end);

    let mut seen = std::collections::HashSet::new();
    scan_call_sites(&content[body_start..body_end], language)
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_SERVICE: &str = "public class UserService {
    public void createUser(String name) {
        validateUser(name);
        saveUser(name);
        sendNotification(name);
    }

    private void validateUser(String name) {
        checkName(name);
    }

    private void saveUser(String name) {
        // save to database
    }

    private String formatMessage(String name, Map<String, Integer> counts) {
        if (name.isEmpty()) {
            return \"\";
        } else if (counts.containsKey(name)) {
            return \"Hello \" + name;
        }
        return name;
    }
}
";

    #[test]
    fn java_functions_have_brace_matched_bounds() {
        let functions = extract_functions(USER_SERVICE, "UserService.java", Language::Java);

        let names: Vec<_> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["createUser", "validateUser", "saveUser", "formatMessage"]
        );
        assert_eq!(functions[0].lines, LineRange::new(2, 6));
        assert_eq!(functions[3].lines, LineRange::new(16, 23));
        assert_eq!(functions[0].signature, "void createUser(String name)");
        assert_eq!(
            functions[3].parameters,
            vec!["String name", "Map<String, Integer> counts"]
        );
        assert!(functions[0].code.starts_with("    public void createUser"));
        assert!(functions[0].code.ends_with("    }"));
    }

    #[test]
    fn java_calls_exclude_the_signature_and_keywords() {
        let functions = extract_functions(USER_SERVICE, "UserService.java", Language::Java);

        assert_eq!(
            functions[0].calls,
            vec!["validateUser", "saveUser", "sendNotification"]
        );
        assert!(functions[2].calls.is_empty());
        assert_eq!(functions[3].calls, vec!["isEmpty", "containsKey"]);
    }

    #[test]
    fn python_functions_end_at_dedent() {
        let code = "def main():\n    run()\n    # done\n\nasync def run() -> int:\n    return helper(1)\n\nclass A:\n    def method(self, x=1):\n        main()\n";
        let functions = extract_functions(code, "app.py", Language::Python);

        let names: Vec<_> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["main", "run", "method"]);
        assert_eq!(functions[0].lines, LineRange::new(1, 4));
        assert_eq!(functions[1].return_type.as_deref(), Some("int"));
        assert_eq!(functions[1].calls, vec!["helper"]);
        assert_eq!(functions[2].parameters, vec!["self", "x=1"]);
        assert_eq!(functions[2].lines, LineRange::new(9, 11));
        assert_eq!(functions[2].signature, "def method(self, x=1)");
    }

    #[test]
    fn duplicate_calls_are_collapsed() {
        let code = "def f():\n    g()\n    g()\n    h()\n";
        let functions = extract_functions(code, "f.py", Language::Python);
        assert_eq!(functions[0].calls, vec!["g", "h"]);
    }

    #[test]
    fn unclosed_java_body_runs_to_end_of_file() {
        let code = "void broken() {\n    call();\n";
        let functions = extract_functions(code, "B.java", Language::Java);
        assert_eq!(functions[0].lines, LineRange::new(1, 3));
        assert_eq!(functions[0].calls, vec!["call"]);
    }
}
