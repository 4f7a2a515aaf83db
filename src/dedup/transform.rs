//! Exact-duplicate removal over an ordered example sequence.
//!
//! Keeps the first occurrence of every fingerprint and drops later
//! repeats, preserving the relative order of what remains. The transformer
//! only builds a new collection; writing it anywhere is the caller's job.

use serde::Serialize;

use super::canonical::Canonicalizer;
use super::fingerprint::{classify, Classification};

/// Result of a deduplication pass.
#[derive(Debug, Clone)]
pub struct DedupeOutcome<T> {
    /// Retained items, in input order.
    pub items: Vec<T>,

    /// Input indices of the removed items, ascending.
    pub removed_indices: Vec<usize>,

    /// Total number of items before deduplication.
    pub total_before: usize,
}

impl<T> DedupeOutcome<T> {
    /// Number of items kept.
    pub fn retained(&self) -> usize {
        self.items.len()
    }

    /// Number of items dropped as duplicates.
    pub fn removed(&self) -> usize {
        self.removed_indices.len()
    }

    /// Returns the removal ratio (removed / total).
    pub fn removal_ratio(&self) -> f64 {
        if self.total_before == 0 {
            return 0.0;
        }
        self.removed() as f64 / self.total_before as f64
    }
}

/// Builds the deduplicated sequence from a precomputed classification.
///
/// Items the classification flagged as unfingerprintable are kept, since
/// nothing proves they repeat an earlier item.
pub fn apply<T: Clone>(items: &[T], classification: &Classification) -> DedupeOutcome<T> {
    let mut kept = Vec::with_capacity(items.len());
    let mut removed_indices = Vec::new();

    for (index, item) in items.iter().enumerate() {
        if classification.is_duplicate(index) {
            removed_indices.push(index);
        } else {
            kept.push(item.clone());
        }
    }

    DedupeOutcome {
        items: kept,
        removed_indices,
        total_before: items.len(),
    }
}

/// Classifies and deduplicates in one pass using the default canonicalizer.
pub fn dedupe<T: Serialize + Clone>(items: &[T]) -> DedupeOutcome<T> {
    dedupe_with(items, &Canonicalizer::default())
}

/// Classifies and deduplicates using a specific canonicalizer.
pub fn dedupe_with<T: Serialize + Clone>(
    items: &[T],
    canonicalizer: &Canonicalizer,
) -> DedupeOutcome<T> {
    let classification = classify(items, canonicalizer);
    apply(items, &classification)
}
