//! Frequency statistics over workflow payloads.
//!
//! Two tables are maintained: one counting node type labels, and one
//! counting source→target patterns derived from the first and last node of
//! each workflow.

use std::collections::HashMap;

use serde::Serialize;

use super::extract::{Payload, PayloadLookup};

/// Separator between namespace segments in a node type label.
pub const TYPE_SEPARATOR: char = '.';

/// Arrow used between the two halves of a pattern key.
pub const PATTERN_ARROW: &str = "→";

/// Returns the part of a type label after the last [`TYPE_SEPARATOR`].
///
/// `"n8n-nodes-base.slack"` becomes `"slack"`; a label without a separator
/// is returned whole.
pub fn type_suffix(label: &str) -> &str {
    label
        .rsplit_once(TYPE_SEPARATOR)
        .map_or(label, |(_, suffix)| suffix)
}

/// Builds the `"<source> → <target>"` key for a workflow's first and last node types.
pub fn pattern_key(first_type: &str, last_type: &str) -> String {
    format!(
        "{} {} {}",
        type_suffix(first_type),
        PATTERN_ARROW,
        type_suffix(last_type)
    )
}

/// Label-to-count mapping that remembers first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
    positions: HashMap<String, usize>,
    total: usize,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `label`.
    pub fn increment(&mut self, label: &str) {
        self.add(label, 1);
    }

    /// Adds `count` occurrences of `label`, inserting it if unseen.
    pub fn add(&mut self, label: &str, count: usize) {
        match self.positions.get(label) {
            Some(&position) => self.entries[position].1 += count,
            None => {
                self.positions.insert(label.to_string(), self.entries.len());
                self.entries.push((label.to_string(), count));
            }
        }
        self.total += count;
    }

    /// Count for `label`, zero if unseen.
    pub fn get(&self, label: &str) -> usize {
        self.positions
            .get(label)
            .map_or(0, |&position| self.entries[position].1)
    }

    /// Number of distinct labels.
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(label, count)| (label.as_str(), *count))
    }

    /// The `k` most frequent labels, by descending count.
    ///
    /// Ties keep first-insertion order.
    pub fn top(&self, k: usize) -> Vec<(String, usize)> {
        let mut ranked: Vec<&(String, usize)> = self.entries.iter().collect();
        // Stable sort keeps insertion order among equal counts.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(k).cloned().collect()
    }
}

/// Accumulated statistics for one dataset's payloads.
#[derive(Debug, Clone, Default)]
pub struct WorkflowStats {
    /// Node type label counts.
    pub node_types: FrequencyTable,

    /// Source→target pattern counts.
    pub patterns: FrequencyTable,

    /// Payloads that contributed to the tables.
    pub payloads_found: usize,

    /// Examples whose payload was absent.
    pub payloads_absent: usize,

    /// Largest node count seen in a single payload.
    pub max_nodes: usize,
}

impl WorkflowStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one lookup result into the statistics.
    pub fn record_lookup(&mut self, lookup: &PayloadLookup) {
        match lookup.payload() {
            Some(payload) => self.record(payload),
            None => self.payloads_absent += 1,
        }
    }

    /// Folds one payload into the statistics.
    pub fn record(&mut self, payload: &Payload) {
        self.payloads_found += 1;

        let nodes = payload.nodes();
        self.max_nodes = self.max_nodes.max(nodes.len());

        for node in &nodes {
            self.node_types.increment(node.type_label());
        }

        if let [first, .., last] = nodes.as_slice() {
            let key = pattern_key(
                first.node_type().unwrap_or_default(),
                last.node_type().unwrap_or_default(),
            );
            self.patterns.increment(&key);
        }
    }

    /// Total nodes counted across all payloads.
    pub fn total_nodes(&self) -> usize {
        self.node_types.total()
    }

    /// Mean node count per found payload.
    pub fn average_nodes(&self) -> f64 {
        if self.payloads_found == 0 {
            return 0.0;
        }
        self.total_nodes() as f64 / self.payloads_found as f64
    }
}

/// Aggregates a sequence of lookups, skipping absent payloads.
pub fn aggregate<'a, I>(lookups: I) -> WorkflowStats
where
    I: IntoIterator<Item = &'a PayloadLookup>,
{
    let mut stats = WorkflowStats::new();
    for lookup in lookups {
        stats.record_lookup(lookup);
    }
    stats
}

/// A labelled count, as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub label: String,
    pub count: usize,
}

impl From<(String, usize)> for RankedEntry {
    fn from((label, count): (String, usize)) -> Self {
        Self { label, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(fields) => Payload::new(fields),
            _ => panic!("payload fixture must be an object"),
        }
    }

    #[test]
    fn test_type_suffix() {
        assert_eq!(type_suffix("n8n-nodes-base.slack"), "slack");
        assert_eq!(type_suffix("@n8n/n8n-nodes-langchain.agent"), "agent");
        assert_eq!(type_suffix("webhook"), "webhook");
        assert_eq!(type_suffix("trailing."), "");
        assert_eq!(type_suffix(""), "");
    }

    #[test]
    fn test_pattern_key() {
        assert_eq!(pattern_key("n8n.start", "n8n.slack"), "start → slack");
        assert_eq!(pattern_key("", "plain"), " → plain");
    }

    #[test]
    fn test_frequency_table_counts() {
        let mut table = FrequencyTable::new();
        table.increment("a");
        table.increment("b");
        table.increment("a");
        table.add("c", 5);

        assert_eq!(table.get("a"), 2);
        assert_eq!(table.get("missing"), 0);
        assert_eq!(table.distinct(), 3);
        assert_eq!(table.total(), 8);
        let order: Vec<_> = table.iter().map(|(label, _)| label).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_top_breaks_ties_by_first_insertion() {
        let mut table = FrequencyTable::new();
        for label in ["x", "y", "z", "y", "x", "w"] {
            table.increment(label);
        }

        assert_eq!(
            table.top(3),
            vec![
                ("x".to_string(), 2),
                ("y".to_string(), 2),
                ("z".to_string(), 1)
            ]
        );
        assert_eq!(table.top(10).len(), 4);
        assert!(table.top(0).is_empty());
    }

    #[test]
    fn test_record_counts_nodes_and_pattern() {
        let mut stats = WorkflowStats::new();
        stats.record(&payload(json!({
            "nodes": [
                {"type": "n8n-nodes-base.webhook"},
                {"type": "n8n-nodes-base.set"},
                {"name": "no type"},
                {"type": "n8n-nodes-base.slack"}
            ]
        })));

        assert_eq!(stats.node_types.get("n8n-nodes-base.webhook"), 1);
        assert_eq!(stats.node_types.get("unknown"), 1);
        assert_eq!(stats.patterns.get("webhook → slack"), 1);
        assert_eq!(stats.total_nodes(), 4);
        assert_eq!(stats.max_nodes, 4);
    }

    #[test]
    fn test_single_or_no_node_has_no_pattern() {
        let mut stats = WorkflowStats::new();
        stats.record(&payload(json!({"nodes": [{"type": "n8n.start"}]})));
        stats.record(&payload(json!({"nodes": []})));
        stats.record(&payload(json!({"name": "no nodes"})));

        assert_eq!(stats.node_types.get("n8n.start"), 1);
        assert!(stats.patterns.is_empty());
        assert_eq!(stats.payloads_found, 3);
    }

    #[test]
    fn test_pattern_uses_empty_suffix_for_untyped_ends() {
        let mut stats = WorkflowStats::new();
        stats.record(&payload(json!({"nodes": [{"name": "a"}, {"type": "n8n.slack"}]})));
        assert_eq!(stats.patterns.get(" → slack"), 1);
        assert_eq!(stats.node_types.get("unknown"), 1);
    }

    #[test]
    fn test_aggregate_skips_absent() {
        use super::super::extract::AbsentReason;

        let lookups = vec![
            PayloadLookup::Found(payload(json!({"nodes": [{"type": "a.x"}, {"type": "b.y"}]}))),
            PayloadLookup::Absent(AbsentReason::NoAssistantMessage),
            PayloadLookup::Found(payload(json!({"nodes": [{"type": "a.x"}, {"type": "b.y"}]}))),
        ];

        let stats = aggregate(&lookups);
        assert_eq!(stats.payloads_found, 2);
        assert_eq!(stats.payloads_absent, 1);
        assert_eq!(stats.patterns.top(1), vec![("x → y".to_string(), 2)]);
        assert!((stats.average_nodes() - 2.0).abs() < 1e-10);
    }
}
