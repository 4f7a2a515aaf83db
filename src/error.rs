//! Error types for dataset analysis operations.
//!
//! Defines error types for the major subsystems:
//! - Dataset loading and writing (file-level failures)
//! - Canonicalization of examples for fingerprinting
//!
//! Configuration errors live next to the configuration in [`crate::config`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing a dataset file.
///
/// Every variant is scoped to a single file: callers report it and move on
/// to the next dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid dataset '{path}': expected a top-level array, found {found}")]
    NotAnArray { path: PathBuf, found: &'static str },

    #[error("Failed to write '{path}': {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Dataset directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while producing the canonical form of a value.
#[derive(Debug, Error)]
pub enum CanonicalizationError {
    #[error("Value cannot be represented as JSON: {0}")]
    Unserializable(#[from] serde_json::Error),

    #[error("Value nesting exceeds the maximum depth of {limit}")]
    DepthExceeded { limit: usize },
}
