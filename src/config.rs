//! Analyzer configuration.
//!
//! Settings come from defaults, then `ANALYZER_*` environment variables,
//! then command-line overrides applied through the `with_*` builder methods.

use std::path::PathBuf;

use thiserror::Error;

use crate::dataset::{FilePattern, DEFAULT_FILE_PATTERN};
use crate::dedup::DEFAULT_MAX_DEPTH;
use crate::workflow::ASSISTANT_ROLE;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration for a dataset analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Directory scanned for dataset files.
    pub dataset_dir: PathBuf,
    /// Glob pattern dataset file names must match.
    pub file_pattern: String,
    /// Number of entries shown in each top-K table.
    pub top_k: usize,
    /// Number of duplicate indices listed before summarizing the rest.
    pub duplicate_preview: usize,
    /// Suffix appended to the file stem of deduplicated outputs.
    pub deduped_suffix: String,
    /// Message role whose content holds the workflow payload.
    pub assistant_role: String,
    /// Maximum nesting depth accepted when fingerprinting examples.
    pub max_depth: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            dataset_dir: PathBuf::from("./datasets"),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            top_k: 10,
            duplicate_preview: 10,
            deduped_suffix: "_deduped".to_string(),
            assistant_role: ASSISTANT_ROLE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl AnalyzerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ANALYZER_DATASET_DIR`: Dataset directory (default: ./datasets)
    /// - `ANALYZER_FILE_PATTERN`: Dataset file name pattern (default: dataset_*.json)
    /// - `ANALYZER_TOP_K`: Entries per top-K table (default: 10)
    /// - `ANALYZER_DUPLICATE_PREVIEW`: Duplicate indices listed (default: 10)
    /// - `ANALYZER_DEDUPED_SUFFIX`: Output file stem suffix (default: _deduped)
    /// - `ANALYZER_ASSISTANT_ROLE`: Role holding the payload (default: assistant)
    /// - `ANALYZER_MAX_DEPTH`: Maximum nesting depth for fingerprinting (default: 512)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("ANALYZER_DATASET_DIR") {
            config.dataset_dir = PathBuf::from(val);
        }

        if let Some(val) = lookup("ANALYZER_FILE_PATTERN") {
            config.file_pattern = val;
        }

        if let Some(val) = lookup("ANALYZER_TOP_K") {
            config.top_k = parse_env_value(&val, "ANALYZER_TOP_K")?;
        }

        if let Some(val) = lookup("ANALYZER_DUPLICATE_PREVIEW") {
            config.duplicate_preview = parse_env_value(&val, "ANALYZER_DUPLICATE_PREVIEW")?;
        }

        if let Some(val) = lookup("ANALYZER_DEDUPED_SUFFIX") {
            config.deduped_suffix = val;
        }

        if let Some(val) = lookup("ANALYZER_ASSISTANT_ROLE") {
            config.assistant_role = val;
        }

        if let Some(val) = lookup("ANALYZER_MAX_DEPTH") {
            config.max_depth = parse_env_value(&val, "ANALYZER_MAX_DEPTH")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::ValidationFailed(
                "top_k must be greater than 0".to_string(),
            ));
        }

        if self.duplicate_preview == 0 {
            return Err(ConfigError::ValidationFailed(
                "duplicate_preview must be greater than 0".to_string(),
            ));
        }

        if self.max_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_depth must be greater than 0".to_string(),
            ));
        }

        if self.deduped_suffix.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "deduped_suffix cannot be empty".to_string(),
            ));
        }

        if self.assistant_role.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "assistant_role cannot be empty".to_string(),
            ));
        }

        FilePattern::new(&self.file_pattern)
            .map_err(|e| ConfigError::ValidationFailed(format!("file_pattern: {e}")))?;

        Ok(())
    }

    /// Compiles the configured file pattern.
    pub fn pattern(&self) -> Result<FilePattern, ConfigError> {
        FilePattern::new(&self.file_pattern)
            .map_err(|e| ConfigError::ValidationFailed(format!("file_pattern: {e}")))
    }

    /// Builder method to set the dataset directory.
    pub fn with_dataset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dataset_dir = dir.into();
        self
    }

    /// Builder method to set the file pattern.
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    /// Builder method to set the top-K table size.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Builder method to set the duplicate preview length.
    pub fn with_duplicate_preview(mut self, preview: usize) -> Self {
        self.duplicate_preview = preview;
        self
    }

    /// Builder method to set the deduplicated output suffix.
    pub fn with_deduped_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.deduped_suffix = suffix.into();
        self
    }

    /// Builder method to set the payload role.
    pub fn with_assistant_role(mut self, role: impl Into<String>) -> Self {
        self.assistant_role = role.into();
        self
    }

    /// Builder method to set the maximum fingerprinting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Parse an environment variable value into a type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}
