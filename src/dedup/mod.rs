//! Exact duplicate detection for dataset examples.
//!
//! Two examples are duplicates when their canonical JSON forms are equal,
//! which ignores object key order and formatting but nothing else.
//!
//! # Usage
//!
//! ```
//! use serde_json::json;
//! use workflow_dataset_analyzer::dedup::{dedupe, Fingerprint};
//!
//! let a = json!({"role": "user", "content": "hi"});
//! let b = json!({"content": "hi", "role": "user"});
//! assert_eq!(Fingerprint::of(&a).unwrap(), Fingerprint::of(&b).unwrap());
//!
//! let outcome = dedupe(&[a, b]);
//! assert_eq!(outcome.retained(), 1);
//! assert_eq!(outcome.removed(), 1);
//! ```

pub mod canonical;
pub mod fingerprint;
pub mod transform;

pub use canonical::{canonicalize, Canonicalizer, DEFAULT_MAX_DEPTH};
pub use fingerprint::{classify, classify_values, Classification, ExampleStatus, Fingerprint, FingerprintIndex};
pub use transform::{apply, dedupe, dedupe_with, DedupeOutcome};
