//! Example fingerprints and the first-seen index used for exact duplicate detection.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::canonical::Canonicalizer;
use crate::error::CanonicalizationError;

/// Hex-encoded SHA-256 digest of a value's canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprints a value using the default canonicalizer.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self, CanonicalizationError> {
        Self::with_canonicalizer(value, &Canonicalizer::default())
    }

    /// Fingerprints a value using a specific canonicalizer.
    pub fn with_canonicalizer<T: Serialize + ?Sized>(
        value: &T,
        canonicalizer: &Canonicalizer,
    ) -> Result<Self, CanonicalizationError> {
        let canonical = canonicalizer.canonicalize(value)?;
        Ok(Self::from_canonical(&canonical))
    }

    /// Fingerprints a parsed JSON value in place, without re-serializing it first.
    pub fn of_value(value: &Value, canonicalizer: &Canonicalizer) -> Result<Self, CanonicalizationError> {
        let canonical = canonicalizer.canonicalize_value(value)?;
        Ok(Self::from_canonical(&canonical))
    }

    /// Digests an already-canonical string.
    pub fn from_canonical(canonical: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Get the hex string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a single example was classified by the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExampleStatus {
    /// First occurrence of its fingerprint.
    Unique,
    /// Repeats the example at `first_index`.
    Duplicate { first_index: usize },
    /// Could not be canonicalized; excluded from duplicate detection.
    Unfingerprintable { reason: String },
}

impl ExampleStatus {
    /// Returns true for second-and-later occurrences of a fingerprint.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ExampleStatus::Duplicate { .. })
    }
}

/// Tracks which fingerprints have been seen, in input order.
///
/// Each call to [`observe`](Self::observe) or
/// [`flag_unfingerprintable`](Self::flag_unfingerprintable) consumes the next
/// input position, so callers must feed examples strictly in order.
#[derive(Debug, Default)]
pub struct FingerprintIndex {
    first_seen: HashMap<Fingerprint, usize>,
    statuses: Vec<ExampleStatus>,
    duplicates: Vec<usize>,
    flagged: Vec<usize>,
}

impl FingerprintIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the fingerprint of the next example.
    ///
    /// Returns `true` the first time a fingerprint is seen and `false` on
    /// every later occurrence.
    pub fn observe(&mut self, fingerprint: Fingerprint) -> bool {
        let position = self.statuses.len();
        match self.first_seen.get(&fingerprint) {
            Some(&first_index) => {
                self.statuses.push(ExampleStatus::Duplicate { first_index });
                self.duplicates.push(position);
                false
            }
            None => {
                self.first_seen.insert(fingerprint, position);
                self.statuses.push(ExampleStatus::Unique);
                true
            }
        }
    }

    /// Consumes the next position for an example that could not be fingerprinted.
    pub fn flag_unfingerprintable(&mut self, reason: impl Into<String>) {
        self.flagged.push(self.statuses.len());
        self.statuses.push(ExampleStatus::Unfingerprintable {
            reason: reason.into(),
        });
    }

    /// Fingerprints `item` and registers it at the next position.
    ///
    /// Items that cannot be canonicalized are flagged instead and yield `None`.
    pub fn observe_item<T: Serialize + ?Sized>(
        &mut self,
        item: &T,
        canonicalizer: &Canonicalizer,
    ) -> Option<bool> {
        self.register(Fingerprint::with_canonicalizer(item, canonicalizer))
    }

    /// Like [`observe_item`](Self::observe_item) for an already-parsed JSON value.
    pub fn observe_value(&mut self, value: &Value, canonicalizer: &Canonicalizer) -> Option<bool> {
        self.register(Fingerprint::of_value(value, canonicalizer))
    }

    fn register(&mut self, fingerprint: Result<Fingerprint, CanonicalizationError>) -> Option<bool> {
        match fingerprint {
            Ok(fingerprint) => Some(self.observe(fingerprint)),
            Err(e) => {
                tracing::warn!(index = self.len(), error = %e, "Example cannot be fingerprinted, excluding from duplicate detection");
                self.flag_unfingerprintable(e.to_string());
                None
            }
        }
    }

    /// Indices of every duplicate observation, ascending.
    pub fn duplicate_indices(&self) -> &[usize] {
        &self.duplicates
    }

    /// Number of distinct fingerprints seen.
    pub fn unique_count(&self) -> usize {
        self.first_seen.len()
    }

    /// Number of positions consumed so far.
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.first_seen.contains_key(fingerprint)
    }

    /// Finishes the index and returns the per-example classification.
    pub fn into_classification(self) -> Classification {
        Classification {
            unique_count: self.first_seen.len(),
            statuses: self.statuses,
            duplicate_indices: self.duplicates,
            flagged_indices: self.flagged,
        }
    }
}

/// Per-example duplicate classification for one ordered dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    statuses: Vec<ExampleStatus>,
    duplicate_indices: Vec<usize>,
    flagged_indices: Vec<usize>,
    unique_count: usize,
}

impl Classification {
    /// Status of the example at `index`, if it was classified.
    pub fn status(&self, index: usize) -> Option<&ExampleStatus> {
        self.statuses.get(index)
    }

    pub fn statuses(&self) -> &[ExampleStatus] {
        &self.statuses
    }

    /// Returns true if the example at `index` repeats an earlier one.
    pub fn is_duplicate(&self, index: usize) -> bool {
        self.statuses
            .get(index)
            .is_some_and(ExampleStatus::is_duplicate)
    }

    /// Duplicate indices in ascending order.
    pub fn duplicate_indices(&self) -> &[usize] {
        &self.duplicate_indices
    }

    /// Indices of examples that could not be fingerprinted.
    pub fn flagged_indices(&self) -> &[usize] {
        &self.flagged_indices
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicate_indices.len()
    }

    /// Number of distinct fingerprints.
    pub fn unique_count(&self) -> usize {
        self.unique_count
    }

    /// Number of classified examples.
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

/// Classifies an ordered sequence of values by exact canonical equality.
pub fn classify<T: Serialize>(items: &[T], canonicalizer: &Canonicalizer) -> Classification {
    let mut index = FingerprintIndex::new();
    for item in items {
        index.observe_item(item, canonicalizer);
    }
    index.into_classification()
}

/// Classifies parsed JSON values without copying them.
pub fn classify_values<'a, I>(values: I, canonicalizer: &Canonicalizer) -> Classification
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut index = FingerprintIndex::new();
    for value in values {
        index.observe_value(value, canonicalizer);
    }
    index.into_classification()
}
