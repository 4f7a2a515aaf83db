//! workflow-dataset-analyzer: statistics and deduplication for workflow training datasets.
//!
//! A dataset is a JSON array of chat-formatted examples whose assistant
//! message carries a serialized workflow. This library detects exact
//! duplicate examples, tallies node types and first/last node patterns,
//! and writes deduplicated copies.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod dedup;
pub mod error;
pub mod workflow;

// Re-export commonly used error types
pub use error::{CanonicalizationError, DatasetError};
