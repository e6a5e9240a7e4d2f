//! Java structural extraction by pattern scanning.
//!
//! Java sources are not parsed. Declarations are recognized line by line with
//! regular expressions and attributed to classes with a brace-depth counter:
//!
//! - A class, interface or enum declaration opens a scope whose body sits one
//!   brace level deeper than the declaration line.
//! - A method declaration belongs to the innermost open class, and only when
//!   it sits directly in that class's body.
//! - A scope closes on the line where the depth drops back below its body
//!   level. At depth zero no class is open.
//! - A class header wrapped over several lines is joined up to its opening
//!   brace before `extends` and `implements` are read.
//!
//! Nested classes come out as independent, flat `ClassRecord`s. Anything the
//! patterns do not recognize is silently skipped.

// Line numbers are stored as u32; no practical source file exceeds that.
#![allow(clippy::cast_possible_truncation)]

use std::sync::LazyLock;

use regex::Regex;

use super::Extractor;
use crate::error::ParseError;
use crate::lexical::{brace_block_end, brace_delta, scan_call_sites};
use crate::types::{ClassKind, ClassRecord, Language, LineRange, MethodRecord, StructuralRecord};

static PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*package\s+([\w.]+)\s*;").expect("package pattern is valid")
});

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*import\s+(?:static\s+)?([\w.]+(?:\.\*)?)\s*;")
        .expect("import pattern is valid")
});

/// Matched against a trimmed line with generic arguments already removed.
static CLASS_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:@\w+(?:\([^)]*\))?\s+)*",
        r"(?:(?:public|protected|private|abstract|final|static|sealed|non-sealed|strictfp)\s+)*",
        r"(@interface|class|interface|enum)\s+(\w+)",
        r"(?:\s+extends\s+([\w.]+)(?:\s*,\s*[\w.]+)*)?",
        r"(?:\s+implements\s+([\w.\s,]+))?",
    ))
    .expect("class declaration pattern is valid")
});

static METHOD_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:@\w+(?:\([^)]*\))?\s+)*",
        r"(?:(?:public|protected|private|static|final|abstract|synchronized|native|default|strictfp)\s+)*",
        r"(?:<[^>]*>\s+)?",
        r"([\w.$]+(?:<.*>)?(?:\[\])*)\s+(\w+)\s*\(([^)]*)\)?",
    ))
    .expect("method declaration pattern is valid")
});

static CONSTRUCTOR_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:public|protected|private)\s+)?(\w+)\s*\([^)]*\)?")
        .expect("constructor pattern is valid")
});

static GENERIC_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("generic argument pattern is valid"));

/// Lines a wrapped class header may span.
const MAX_HEADER_LINES: usize = 8;

/// Words that can occupy the return-type or name slot of the method pattern
/// without the line being a method declaration.
const NOT_A_DECLARATION: &[&str] = &[
    "return", "new", "throw", "else", "case", "if", "for", "while", "switch", "catch", "do",
    "try", "package", "import", "class", "interface", "enum", "extends", "implements",
    "instanceof", "assert", "break", "continue", "yield", "this", "super", "public",
    "protected", "private", "static", "final", "abstract", "synchronized", "native",
    "default", "strictfp",
];

/// Java extractor based on lexical pattern matching.
pub struct JavaExtractor;

impl Extractor for JavaExtractor {
    fn language(&self) -> Language {
        Language::Java
    }

    fn extract(&self, content: &str, path: &str) -> Result<StructuralRecord, ParseError> {
        Ok(scan(content, path))
    }
}

/// A class whose closing brace has not been seen yet.
#[derive(Debug)]
struct OpenClass {
    /// Index into `StructuralRecord::classes`
    index: usize,
    /// Brace depth of the class body
    body_depth: i64,
    /// Whether the opening brace has been seen
    opened: bool,
}

/// A parsed class declaration line.
#[derive(Debug, PartialEq, Eq)]
struct ClassDecl {
    kind: ClassKind,
    name: String,
    parent: Option<String>,
    interfaces: Vec<String>,
}

/// A parsed method declaration line.
#[derive(Debug, PartialEq, Eq)]
struct MethodDecl {
    return_type: String,
    name: String,
    parameters: Vec<String>,
    /// Byte offset just past the parameter list
    signature_end: usize,
}

/// Scan a whole Java file.
fn scan(content: &str, path: &str) -> StructuralRecord {
    let mut record = StructuralRecord::empty(path, Language::Java);
    record.package = PACKAGE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());
    record.imports = IMPORT
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    let lines: Vec<&str> = content.lines().collect();
    let mut depth: i64 = 0;
    let mut open: Vec<OpenClass> = Vec::new();

    for (idx, raw) in lines.iter().enumerate() {
        let line_no = idx as u32 + 1;
        let line = raw.trim();
        let depth_before = depth;
        let mut calls_from = if is_non_code(line) { None } else { Some(0) };

        if let Some(decl) = match_class(line).map(|decl| {
            if line.contains('{') || line.ends_with(';') {
                decl
            } else {
                match_class(&declaration_header(&lines, idx)).unwrap_or(decl)
            }
        }) {
            let mut class = ClassRecord::new(decl.name, decl.kind, path, line_no);
            class.parent = decl.parent;
            class.interfaces = decl.interfaces;
            record.classes.push(class);
            open.push(OpenClass {
                index: record.classes.len() - 1,
                body_depth: depth_before + 1,
                opened: line.contains('{'),
            });
            calls_from = None;
        } else if let Some(top) = open.last()
            && top.opened
            && depth_before == top.body_depth
        {
            let class_name = record.classes[top.index].name.clone();
            if let Some(method) = match_method(line).filter(|m| m.name != class_name) {
                let code = strip_line_comment(line);
                let end = if code.ends_with(';') && !code.contains('{') {
                    line_no
                } else {
                    brace_block_end(&lines, idx) as u32
                };
                calls_from = Some(method.signature_end);
                record.classes[top.index].methods.push(MethodRecord {
                    name: method.name,
                    class_name,
                    return_type: method.return_type,
                    parameters: method.parameters,
                    lines: LineRange::new(line_no, end),
                });
            } else if let Some(end) = match_constructor(line, &class_name) {
                calls_from = Some(end);
            }
        }

        if let Some(from) = calls_from {
            record
                .calls
                .extend(scan_call_sites(&line[from..], Language::Java));
        }

        depth = (depth + brace_delta(line)).max(0);

        if let Some(top) = open.last_mut()
            && !top.opened
            && depth >= top.body_depth
        {
            top.opened = true;
        }
        while let Some(top) = open.last() {
            if top.opened && depth < top.body_depth {
                record.classes[top.index].end_line = Some(line_no);
                open.pop();
            } else {
                break;
            }
        }
    }

    record
}

/// Comment, annotation and directive lines carry no call sites.
fn is_non_code(line: &str) -> bool {
    line.is_empty()
        || line.starts_with("//")
        || line.starts_with("/*")
        || line.starts_with('*')
        || line.starts_with('@')
        || line.starts_with("import ")
        || line.starts_with("package ")
}

/// A class header that wraps over several lines, joined into one line up
/// to the line holding its opening brace.
fn declaration_header(lines: &[&str], start: usize) -> String {
    let mut header = String::new();
    for line in lines.iter().skip(start).take(MAX_HEADER_LINES) {
        let code = strip_line_comment(line.trim());
        if !header.is_empty() {
            header.push(' ');
        }
        header.push_str(code);
        if code.contains('{') || code.ends_with(';') {
            break;
        }
    }
    header
}

/// Text before a trailing `//` comment, right-trimmed.
fn strip_line_comment(line: &str) -> &str {
    line.find("//").map_or(line, |i| &line[..i]).trim_end()
}

/// Remove generic argument lists (`<...>`), innermost first.
fn strip_generics(line: &str) -> String {
    let mut current = line.to_string();
    loop {
        let next = GENERIC_ARGS.replace_all(&current, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn match_class(line: &str) -> Option<ClassDecl> {
    let stripped = strip_generics(line);
    let caps = CLASS_DECL.captures(&stripped)?;
    let keyword = caps.get(1)?.as_str();
    let kind = if keyword == "@interface" {
        ClassKind::Interface
    } else {
        ClassKind::from_keyword(keyword)?
    };
    let interfaces = caps
        .get(4)
        .map(|m| {
            m.as_str()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| s.split_whitespace().next())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(ClassDecl {
        kind,
        name: caps.get(2)?.as_str().to_string(),
        parent: caps.get(3).map(|m| m.as_str().to_string()),
        interfaces,
    })
}

fn match_method(line: &str) -> Option<MethodDecl> {
    let caps = METHOD_DECL.captures(line)?;
    let return_type = caps.get(1)?.as_str();
    let name = caps.get(2)?.as_str();
    if NOT_A_DECLARATION.contains(&return_type) || NOT_A_DECLARATION.contains(&name) {
        return None;
    }
    let parameters = caps
        .get(3)
        .map(|m| split_parameters(m.as_str()))
        .unwrap_or_default();

    Some(MethodDecl {
        return_type: return_type.to_string(),
        name: name.to_string(),
        parameters,
        signature_end: caps.get(0)?.end(),
    })
}

fn match_constructor(line: &str, class_name: &str) -> Option<usize> {
    let caps = CONSTRUCTOR_DECL.captures(line)?;
    if caps.get(1)?.as_str() == class_name {
        Some(caps.get(0)?.end())
    } else {
        None
    }
}

/// Split a parameter list on commas that are not inside generic arguments.
pub(crate) fn split_parameters(params: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut angle = 0usize;

    for ch in params.chars() {
        match ch {
            '<' => {
                angle += 1;
                current.push(ch);
            }
            '>' => {
                angle = angle.saturating_sub(1);
                current.push(ch);
            }
            ',' if angle == 0 => {
                out.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    out.push(current);

    out.into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
