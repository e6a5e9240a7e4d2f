//! Domain types for structural extraction.
//!
//! One `StructuralRecord` is produced per source file. Records are read-only
//! once extracted; the graph builder consumes them by reference.
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Language | Enum not String | Selects the extractor; unknown extensions are rejected early |
//! | Class identity | Bare name | Matches graph identifiers; cross-file collisions alias |
//! | Parameters | Raw strings | Extraction is lexical, types are never interpreted |
//! | Lines | 1-indexed `u32` | Same convention as editors and diffs |

use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Enums
// ============================================================================

/// Supported source languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Java source files (`.java`), scanned with patterns
    Java,
    /// Python source files (`.py`), walked as a syntax tree
    Python,
}

impl Language {
    /// File extensions handled by this language.
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Java => &["java"],
            Self::Python => &["py"],
        }
    }

    /// Detect language from file extension.
    ///
    /// # Returns
    ///
    /// `None` if the extension is not recognized.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "java" => Some(Self::Java),
            "py" => Some(Self::Python),
            _ => None,
        }
    }

    /// Detect language from a file path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Lowercase name, as used in configuration files and exports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Python => "python",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Java => write!(f, "Java"),
            Self::Python => write!(f, "Python"),
        }
    }
}

/// What kind of type declaration a `ClassRecord` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    /// `class` (Java) or `class` statement (Python)
    Class,
    /// Java `interface` (including `@interface`)
    Interface,
    /// Java `enum`
    Enum,
}

impl ClassKind {
    /// Parse the declaration keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "class" => Some(Self::Class),
            "interface" => Some(Self::Interface),
            "enum" => Some(Self::Enum),
            _ => None,
        }
    }
}

// ============================================================================
// Positions
// ============================================================================

/// An inclusive range of 1-indexed source lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    /// First line (1-indexed)
    pub start: u32,
    /// Last line (1-indexed, inclusive)
    pub end: u32,
}

impl LineRange {
    /// Create a range; `end` is clamped so it never precedes `start`.
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// A range covering a single line.
    #[must_use]
    pub fn single(line: u32) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    /// Whether `line` falls inside the range.
    #[must_use]
    pub fn contains(&self, line: u32) -> bool {
        (self.start..=self.end).contains(&line)
    }
}

// ============================================================================
// Records
// ============================================================================

/// A method declared inside a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord {
    /// Method name
    pub name: String,
    /// Name of the owning class
    pub class_name: String,
    /// Return type as written (uninterpreted; empty when absent)
    pub return_type: String,
    /// Parameters as written, one string per parameter
    pub parameters: Vec<String>,
    /// Lines spanned by the declaration and its body
    pub lines: LineRange,
}

/// A class, interface or enum declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Declared name (bare, not package-qualified)
    pub name: String,
    /// Declaration keyword
    pub kind: ClassKind,
    /// File that declares the class
    pub file: String,
    /// Line of the declaration (1-indexed)
    pub line: u32,
    /// Line where the class body ends, when it could be determined
    pub end_line: Option<u32>,
    /// Single parent class (`extends`, or the first Python base)
    pub parent: Option<String>,
    /// Implemented interfaces (Java) or additional bases (Python)
    pub interfaces: Vec<String>,
    /// Methods in declaration order
    pub methods: Vec<MethodRecord>,
}

impl ClassRecord {
    /// Create a class record with no parent, interfaces or methods.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ClassKind, file: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            file: file.into(),
            line,
            end_line: None,
            parent: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }
}

/// A top-level (module-level) Python function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    /// Function name
    pub name: String,
    /// Declaring file
    pub file: String,
    /// Line of the `def` (1-indexed)
    pub line: u32,
    /// Positional parameter names
    pub parameters: Vec<String>,
}

/// Structural facts extracted from one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralRecord {
    /// File path as given to the extractor
    pub path: String,
    /// Source language
    pub language: Language,
    /// Java package declaration, if any
    pub package: Option<String>,
    /// Imports in file order, duplicates kept
    pub imports: Vec<String>,
    /// Classes in file order
    pub classes: Vec<ClassRecord>,
    /// Top-level functions (Python only)
    pub functions: Vec<FunctionRecord>,
    /// Call-site names in the order they were found
    pub calls: Vec<String>,
}

impl StructuralRecord {
    /// An empty record for `path`.
    ///
    /// Used for malformed input and for files whose parse failed, so that a
    /// batch still carries one record per file.
    #[must_use]
    pub fn empty(path: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
            package: None,
            imports: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Whether extraction found nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.package.is_none()
            && self.imports.is_empty()
            && self.classes.is_empty()
            && self.functions.is_empty()
            && self.calls.is_empty()
    }

    /// Names of the interfaces declared in this file.
    #[must_use]
    pub fn interfaces(&self) -> Vec<&str> {
        self.classes
            .iter()
            .filter(|c| c.kind == ClassKind::Interface)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Look up a class declared in this file by name.
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&ClassRecord> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Every method of every class, in file order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodRecord> {
        self.classes.iter().flat_map(|c| c.methods.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("java", Some(Language::Java))]
    #[case("JAVA", Some(Language::Java))]
    #[case("py", Some(Language::Python))]
    #[case("rs", None)]
    #[case("", None)]
    fn language_from_extension(#[case] ext: &str, #[case] expected: Option<Language>) {
        assert_eq!(Language::from_extension(ext), expected);
    }

    #[test]
    fn language_from_path() {
        assert_eq!(
            Language::from_path(Path::new("src/main/java/App.java")),
            Some(Language::Java)
        );
        assert_eq!(Language::from_path(Path::new("pkg/app.py")), Some(Language::Python));
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn language_serializes_lowercase() {
        let json = serde_json::to_string(&Language::Python).expect("serialize language");
        assert_eq!(json, "\"python\"");
    }

    #[test]
    fn line_range_clamps_end() {
        let range = LineRange::new(10, 4);
        assert_eq!(range.end, 10);
        assert!(range.contains(10));
        assert!(!range.contains(11));
    }

    #[test]
    fn empty_record_is_empty() {
        let record = StructuralRecord::empty("A.java", Language::Java);
        assert!(record.is_empty());
        assert_eq!(record.path, "A.java");
    }

    #[test]
    fn interfaces_lists_only_interface_declarations() {
        let mut record = StructuralRecord::empty("A.java", Language::Java);
        record
            .classes
            .push(ClassRecord::new("Service", ClassKind::Interface, "A.java", 1));
        record
            .classes
            .push(ClassRecord::new("ServiceImpl", ClassKind::Class, "A.java", 5));

        assert_eq!(record.interfaces(), vec!["Service"]);
        assert!(record.class("ServiceImpl").is_some());
    }
}
