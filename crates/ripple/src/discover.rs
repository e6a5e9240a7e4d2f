//! Source file discovery.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::types::Language;

/// Files found under a root, plus directories that could not be read.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Source files of enabled languages, sorted
    pub files: Vec<PathBuf>,
    /// Unreadable directories with the reason
    pub skipped_dirs: Vec<(PathBuf, String)>,
}

/// Walk `root` collecting source files of the languages enabled in `config`.
///
/// Hidden entries and the configured excluded directories are not entered.
/// Unreadable and symlinked directories are recorded and skipped.
///
/// # Errors
///
/// Returns `Error::Config` if `root` is not a directory.
pub fn discover_sources(root: &Path, config: &AnalysisConfig) -> Result<Discovery> {
    if !root.is_dir() {
        return Err(Error::Config(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let mut discovery = Discovery::default();
    walk_dir(root, config, &mut discovery);
    discovery.files.sort();

    debug!(
        root = %root.display(),
        files = discovery.files.len(),
        skipped = discovery.skipped_dirs.len(),
        "Discovered source files"
    );
    Ok(discovery)
}

fn walk_dir(dir: &Path, config: &AnalysisConfig, discovery: &mut Discovery) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(
                directory = %dir.display(),
                error = %e,
                "Cannot read directory, skipping"
            );
            discovery.skipped_dirs.push((dir.to_path_buf(), e.to_string()));
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(
                    directory = %dir.display(),
                    error = %e,
                    "Failed to read directory entry, skipping"
                );
                continue;
            }
        };

        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot stat entry, skipping");
                continue;
            }
        };

        if file_type.is_symlink() {
            if path.is_dir() {
                debug!(directory = %path.display(), "Not following symlinked directory");
                discovery
                    .skipped_dirs
                    .push((path, "symbolic link".to_string()));
            } else if path.is_file() && is_wanted(&path, config) {
                discovery.files.push(path);
            }
        } else if file_type.is_dir() {
            if !config.is_excluded_dir(name) {
                walk_dir(&path, config, discovery);
            }
        } else if file_type.is_file() && is_wanted(&path, config) {
            discovery.files.push(path);
        }
    }
}

fn is_wanted(path: &Path, config: &AnalysisConfig) -> bool {
    Language::from_path(path).is_some_and(|lang| config.includes_language(lang))
}
