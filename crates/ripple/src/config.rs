//! Analysis configuration.
//!
//! Settings live in an optional `.ripple.yaml` at the project root. Every key
//! is optional; missing keys fall back to the defaults below.
//!
//! ```yaml
//! max-depth: 5
//! report-chain-limit: 5
//! call-chain-report-depth: 3
//! class-proximity: 50
//! method-proximity: 20
//! excluded-dirs: [target, node_modules, build]
//! languages: [java, python]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Language;

/// Name of the configuration file looked up at the project root
pub const CONFIG_FILE_NAME: &str = ".ripple.yaml";

/// Default traversal depth for impact tracing and call chains
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Default number of chains shown per item in reports
pub const DEFAULT_REPORT_CHAIN_LIMIT: usize = 5;

/// Default depth of the chains printed in call-chain reports
pub const DEFAULT_CALL_CHAIN_REPORT_DEPTH: usize = 3;

/// Default line distance within which a changed line is attributed to a class
pub const DEFAULT_CLASS_PROXIMITY: u32 = 50;

/// Default line distance within which a changed line is attributed to a method
pub const DEFAULT_METHOD_PROXIMITY: u32 = 20;

/// Directories skipped during source discovery unless overridden
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "target",
    "node_modules",
    "build",
    "dist",
    "vendor",
    "__pycache__",
    "bin",
    "obj",
    "out",
];

/// Tunable parameters for analysis and reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Maximum number of hops followed from a root
    pub max_depth: usize,

    /// Chains listed per item in Markdown reports
    pub report_chain_limit: usize,

    /// Depth of the sample chains in call-chain reports
    pub call_chain_report_depth: usize,

    /// A changed line attributes its class when closer than this many lines
    /// to the class declaration
    pub class_proximity: u32,

    /// A changed line attributes its method when closer than this many lines
    /// to the method declaration
    pub method_proximity: u32,

    /// Directory names never descended into
    pub excluded_dirs: Vec<String>,

    /// Languages included in discovery
    pub languages: Vec<Language>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            report_chain_limit: DEFAULT_REPORT_CHAIN_LIMIT,
            call_chain_report_depth: DEFAULT_CALL_CHAIN_REPORT_DEPTH,
            class_proximity: DEFAULT_CLASS_PROXIMITY,
            method_proximity: DEFAULT_METHOD_PROXIMITY,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|d| (*d).to_string())
                .collect(),
            languages: vec![Language::Java, Language::Python],
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// it is not valid YAML, contains unknown keys, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load `<root>/.ripple.yaml` if present, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error only when the file exists but cannot be loaded.
    pub fn discover(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            debug!(root = %root.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if serialization fails and `Error::Io` if the
    /// file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when a report would list no chains or no
    /// language is enabled.
    pub fn validate(&self) -> Result<()> {
        if self.report_chain_limit == 0 {
            return Err(Error::Config(
                "report-chain-limit must be at least 1".to_string(),
            ));
        }
        if self.languages.is_empty() {
            return Err(Error::Config(
                "at least one language must be enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a directory name is excluded from discovery.
    #[must_use]
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }

    /// Whether a language is enabled.
    #[must_use]
    pub fn includes_language(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_documented_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.report_chain_limit, 5);
        assert_eq!(config.call_chain_report_depth, 3);
        assert_eq!(config.class_proximity, 50);
        assert_eq!(config.method_proximity, 20);
        assert!(config.is_excluded_dir("node_modules"));
        assert!(!config.is_excluded_dir("src"));
        assert!(config.includes_language(Language::Python));
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let config: AnalysisConfig =
            serde_yaml::from_str("max-depth: 2\nlanguages: [python]\n").expect("valid yaml");

        assert_eq!(config.max_depth, 2);
        assert_eq!(config.languages, vec![Language::Python]);
        assert_eq!(config.report_chain_limit, DEFAULT_REPORT_CHAIN_LIMIT);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: std::result::Result<AnalysisConfig, _> =
            serde_yaml::from_str("max_depth: 2\n");
        assert!(result.is_err());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = AnalysisConfig {
            max_depth: 8,
            excluded_dirs: vec!["generated".to_string()],
            ..AnalysisConfig::default()
        };

        config.save(&path).expect("save");
        let loaded = AnalysisConfig::load(&path).expect("load");

        assert_eq!(loaded, config);
    }

    #[test]
    fn discover_without_file_uses_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let config = AnalysisConfig::discover(dir.path()).expect("discover");
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn discover_reads_project_file() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "method-proximity: 5\n")
            .expect("write config");

        let config = AnalysisConfig::discover(dir.path()).expect("discover");
        assert_eq!(config.method_proximity, 5);
    }

    #[test]
    fn zero_chain_limit_fails_validation() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "report-chain-limit: 0\n").expect("write config");

        let err = AnalysisConfig::load(&path).expect_err("zero limit is invalid");
        assert!(matches!(err, Error::Config(_)));
    }
}
