//! Structural extraction: source text in, `StructuralRecord` out.
//!
//! Each supported language implements the `Extractor` trait. The two
//! implementations differ in kind:
//!
//! - **Java**: a lexical scanner driven by regular expressions and a brace
//!   depth counter. It never fails; malformed input just matches less.
//! - **Python**: a tree-sitter syntax-tree walk. Text that does not parse
//!   cleanly is reported as a `ParseError`.
//!
//! Extraction is a pure function of one file's text, so batches are parsed in
//! parallel with rayon.

pub mod java;
pub mod python;
mod tree_sitter_utils;

use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{FileError, ParseError};
use crate::types::{Language, StructuralRecord};

/// Language-specific structural extraction.
pub trait Extractor: Send + Sync {
    /// The language this extractor handles.
    fn language(&self) -> Language;

    /// File extensions this extractor handles.
    fn extensions(&self) -> &[&str] {
        self.language().extensions()
    }

    /// Extract the structural record of one file.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` when the text cannot be parsed. Only
    /// grammar-backed extractors fail; lexical ones degrade to fewer matches.
    fn extract(&self, content: &str, path: &str) -> Result<StructuralRecord, ParseError>;
}

/// Get the extractor for a language.
#[must_use]
pub fn extractor_for(language: Language) -> &'static dyn Extractor {
    match language {
        Language::Java => &java::JavaExtractor,
        Language::Python => &python::PythonExtractor,
    }
}

/// Extract the structural record of one file's text.
///
/// # Errors
///
/// Returns `ParseError` for Python text with syntax errors.
pub fn extract(
    content: &str,
    path: &str,
    language: Language,
) -> Result<StructuralRecord, ParseError> {
    extractor_for(language).extract(content, path)
}

/// One source file, already read into memory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path used as the file identifier in records and graphs
    pub path: PathBuf,
    /// Language selected from the extension
    pub language: Language,
    /// Full file text
    pub content: String,
}

impl SourceFile {
    /// Create a source file from already-loaded text.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, language: Language, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language,
            content: content.into(),
        }
    }

    /// Read a source file from disk.
    ///
    /// # Errors
    ///
    /// Returns a `FileError` for unsupported extensions, unreadable files and
    /// content that is not UTF-8.
    pub fn read(path: impl Into<PathBuf>) -> Result<Self, FileError> {
        let path = path.into();
        let Some(language) = Language::from_path(&path) else {
            return Err(FileError::unsupported_language(path));
        };
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => return Err(FileError::io_error(path, &e)),
        };
        match String::from_utf8(bytes) {
            Ok(content) => Ok(Self {
                path,
                language,
                content,
            }),
            Err(_) => Err(FileError::encoding_error(path)),
        }
    }

    /// The path as a string identifier.
    #[must_use]
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Result of extracting a batch of files.
///
/// `records` holds exactly one record per input file, in input order. A file
/// that failed to parse contributes an empty record and an entry in `errors`.
#[derive(Debug, Default)]
pub struct ExtractionBatch {
    /// One record per input file
    pub records: Vec<StructuralRecord>,
    /// Per-file failures, in input order
    pub errors: Vec<FileError>,
}

impl ExtractionBatch {
    /// Number of files that extracted without error.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.records.len() - self.errors.len()
    }
}

/// Extract every file of a batch.
///
/// Files are parsed in parallel; failures are scoped to their file.
#[must_use]
pub fn extract_batch(sources: &[SourceFile]) -> ExtractionBatch {
    let results: Vec<Result<StructuralRecord, (StructuralRecord, FileError)>> = sources
        .par_iter()
        .map(|source| {
            let path = source.path_str();
            match extract(&source.content, &path, source.language) {
                Ok(record) => {
                    debug!(
                        file = %path,
                        classes = record.classes.len(),
                        imports = record.imports.len(),
                        "Extracted structure"
                    );
                    Ok(record)
                }
                Err(e) => {
                    warn!(file = %path, error = %e, "Extraction failed, recording empty structure");
                    Err((
                        StructuralRecord::empty(path, source.language),
                        FileError::parse_failed(&e),
                    ))
                }
            }
        })
        .collect();

    let mut batch = ExtractionBatch::default();
    for result in results {
        match result {
            Ok(record) => batch.records.push(record),
            Err((record, error)) => {
                batch.records.push(record);
                batch.errors.push(error);
            }
        }
    }
    batch
}
