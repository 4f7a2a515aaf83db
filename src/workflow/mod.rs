//! Workflow payloads embedded in training examples.
//!
//! The `extract` module pulls the workflow JSON out of an example's
//! assistant message; `stats` counts node types and source→target patterns
//! across the payloads of a dataset.

pub mod extract;
pub mod stats;

pub use extract::{
    extract, AbsentReason, Node, Payload, PayloadExtractor, PayloadLookup, ASSISTANT_ROLE,
    UNKNOWN_NODE_TYPE,
};
pub use stats::{
    aggregate, pattern_key, type_suffix, FrequencyTable, RankedEntry, WorkflowStats,
    PATTERN_ARROW, TYPE_SEPARATOR,
};
