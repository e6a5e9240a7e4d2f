//! Error types for ripple operations.
//!
//! Errors come in two tiers:
//!
//! - **`Error`**: infrastructure failures that stop an operation (I/O, bad
//!   configuration, an unusable requested file)
//! - **`FileError`**: per-file problems that are collected while a batch keeps
//!   going
//!
//! `ParseError` is the one failure the extractors themselves report. It is
//! scoped to a single file: `extract_batch` turns it into a `FileError` plus an
//! empty record and moves on to the next file.
//!
//! `FileErrorKind` separates input problems (the source file is at fault) from
//! internal problems (reading it failed).

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ripple operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for ripple operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A single requested source file could not be used
    #[error(transparent)]
    File(#[from] FileError),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// Serializing an export or report failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A source file whose text could not be turned into a syntax tree.
///
/// Only the Python extractor produces this; the Java scanner degrades to
/// fewer matches instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}:{line}: {message}")]
pub struct ParseError {
    /// Path of the file as given to the extractor
    pub path: String,
    /// 1-indexed line of the first syntax error (0 if unknown)
    pub line: u32,
    /// Human-readable description
    pub message: String,
}

impl ParseError {
    /// Create a parse error for a file.
    #[must_use]
    pub fn new(path: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

/// Error encountered while processing one file of a batch.
///
/// These are collected and reported next to the successful results; they
/// never abort sibling work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    /// Path to the file that failed
    pub path: PathBuf,
    /// Category of the error
    pub kind: FileErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.path.display(),
            self.message,
            self.kind
        )
    }
}

impl std::error::Error for FileError {}

/// Categorization of per-file errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileErrorKind {
    // === Input problems ===
    /// Source text has syntax errors that prevent building a tree
    ParseFailed,

    /// File extension is not Java or Python
    UnsupportedLanguage,

    /// File content is not valid UTF-8
    EncodingError,

    // === Internal problems ===
    /// Could not read the file from disk
    IoError,
}

impl std::fmt::Display for FileErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseFailed => write!(f, "parse failed"),
            Self::UnsupportedLanguage => write!(f, "unsupported language"),
            Self::EncodingError => write!(f, "encoding error"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl FileErrorKind {
    /// Returns `true` if the source file itself is at fault.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::ParseFailed | Self::UnsupportedLanguage | Self::EncodingError
        )
    }

    /// Returns `true` if reading the file failed.
    #[must_use]
    pub fn is_internal_error(&self) -> bool {
        matches!(self, Self::IoError)
    }
}

impl FileError {
    /// Create a new per-file error.
    #[must_use]
    pub fn new(path: PathBuf, kind: FileErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    /// Create a per-file error from an extractor `ParseError`.
    #[must_use]
    pub fn parse_failed(error: &ParseError) -> Self {
        Self::new(
            PathBuf::from(&error.path),
            FileErrorKind::ParseFailed,
            format!("line {}: {}", error.line, error.message),
        )
    }

    /// Create an unsupported language error.
    #[must_use]
    pub fn unsupported_language(path: PathBuf) -> Self {
        let ext = path
            .extension()
            .map_or_else(|| "none".to_string(), |e| e.to_string_lossy().to_string());
        Self::new(
            path,
            FileErrorKind::UnsupportedLanguage,
            format!("unsupported extension: {ext}"),
        )
    }

    /// Create an encoding error for a file.
    #[must_use]
    pub fn encoding_error(path: PathBuf) -> Self {
        Self::new(path, FileErrorKind::EncodingError, "file is not valid UTF-8")
    }

    /// Create an I/O error for a file.
    #[must_use]
    pub fn io_error(path: PathBuf, error: &std::io::Error) -> Self {
        Self::new(path, FileErrorKind::IoError, error.to_string())
    }
}
