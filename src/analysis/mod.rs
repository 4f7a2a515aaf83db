//! Per-file dataset analysis.
//!
//! An [`Analyzer`] runs the two independent pipelines over one dataset:
//! fingerprinting for duplicate detection, and payload extraction for node
//! statistics. All state it builds is local to the file being analyzed;
//! only the additive totals in [`report::RunSummary`] cross file boundaries.

pub mod report;
pub mod run;

use std::path::{Path, PathBuf};

use crate::config::AnalyzerConfig;
use crate::dataset::{deduped_output_path, load_dataset, write_dataset, Example, LoadedDataset};
use crate::dedup::{apply, classify_values, Canonicalizer, Classification, DedupeOutcome, FingerprintIndex};
use crate::error::DatasetError;
use crate::workflow::{PayloadExtractor, PayloadLookup, WorkflowStats};

pub use report::{DatasetReport, DedupeReport, FileFailure, RunReport, RunSummary};
pub use run::{run_analysis, RunEvent};

/// Analysis of a single dataset file.
#[derive(Debug, Clone)]
pub struct DatasetAnalysis {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
    pub classification: Classification,
    pub stats: WorkflowStats,
}

impl DatasetAnalysis {
    pub fn total_examples(&self) -> usize {
        self.classification.len()
    }
}

/// Runs duplicate detection and workflow statistics over datasets.
#[derive(Debug, Clone)]
pub struct Analyzer {
    canonicalizer: Canonicalizer,
    extractor: PayloadExtractor,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::from_config(&AnalyzerConfig::default())
    }
}

impl Analyzer {
    pub fn new(canonicalizer: Canonicalizer, extractor: PayloadExtractor) -> Self {
        Self {
            canonicalizer,
            extractor,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(
            Canonicalizer::new(config.max_depth),
            PayloadExtractor::new(config.assistant_role.clone()),
        )
    }

    /// Classifies and aggregates an ordered example sequence in one pass.
    ///
    /// Every example is fingerprinted, including those without a payload;
    /// only examples with a payload contribute to the statistics.
    pub fn analyze_examples(&self, examples: &[Example]) -> (Classification, WorkflowStats) {
        let mut index = FingerprintIndex::new();
        let mut stats = WorkflowStats::new();

        for (position, example) in examples.iter().enumerate() {
            index.observe_value(example.as_value(), &self.canonicalizer);

            let lookup = self.extractor.extract(example);
            if let PayloadLookup::Absent(reason) = &lookup {
                tracing::trace!(index = position, reason = %reason, "No workflow payload");
            }
            stats.record_lookup(&lookup);
        }

        (index.into_classification(), stats)
    }

    /// Analyzes a loaded dataset.
    pub fn analyze(&self, dataset: &LoadedDataset) -> DatasetAnalysis {
        let (classification, stats) = self.analyze_examples(&dataset.examples);

        tracing::info!(
            file = %dataset.path.display(),
            examples = classification.len(),
            duplicates = classification.duplicate_count(),
            payloads = stats.payloads_found,
            "Analyzed dataset"
        );

        DatasetAnalysis {
            path: dataset.path.clone(),
            file_name: dataset.file_name(),
            size_bytes: dataset.size_bytes,
            classification,
            stats,
        }
    }

    /// Loads and analyzes a dataset file.
    pub fn analyze_file(&self, path: &Path) -> Result<DatasetAnalysis, DatasetError> {
        let dataset = load_dataset(path)?;
        Ok(self.analyze(&dataset))
    }

    /// Deduplicates a sequence of examples.
    pub fn dedupe(&self, examples: &[Example]) -> DedupeOutcome<Example> {
        let classification =
            classify_values(examples.iter().map(Example::as_value), &self.canonicalizer);
        apply(examples, &classification)
    }

    /// Reads `input`, deduplicates it, and writes the result to `output`.
    ///
    /// Nothing is written unless the whole input was read and transformed.
    pub fn dedupe_file(&self, input: &Path, output: &Path) -> Result<DedupeReport, DatasetError> {
        let dataset = load_dataset(input)?;
        let outcome = self.dedupe(&dataset.examples);
        write_dataset(output, &outcome.items)?;

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            retained = outcome.retained(),
            removed = outcome.removed(),
            "Wrote deduplicated dataset"
        );

        Ok(DedupeReport::new(input, output, &outcome))
    }
}

/// Default output path for a deduplicated copy of `input`.
pub fn default_output_path(input: &Path, config: &AnalyzerConfig) -> PathBuf {
    deduped_output_path(input, &config.deduped_suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn workflow_example(types: &[&str]) -> Example {
        let nodes: Vec<_> = types.iter().map(|t| json!({"type": t})).collect();
        let content = serde_json::to_string(&json!({"nodes": nodes})).unwrap();
        Example::new(json!({
            "messages": [
                {"role": "user", "content": "make a workflow"},
                {"role": "assistant", "content": content}
            ]
        }))
    }

    #[test]
    fn test_analyze_examples_runs_both_pipelines() {
        let examples = vec![
            workflow_example(&["n8n.webhook", "n8n.set", "n8n.slack"]),
            workflow_example(&["n8n.webhook", "n8n.set", "n8n.slack"]),
            workflow_example(&["n8n.cron"]),
            Example::new(json!({"messages": [{"role": "assistant", "content": "oops"}]})),
        ];

        let (classification, stats) = Analyzer::default().analyze_examples(&examples);

        assert_eq!(classification.len(), 4);
        assert_eq!(classification.duplicate_indices(), &[1]);
        assert_eq!(stats.payloads_found, 3);
        assert_eq!(stats.payloads_absent, 1);
        assert_eq!(stats.node_types.get("n8n.webhook"), 2);
        assert_eq!(stats.node_types.get("n8n.cron"), 1);
        assert_eq!(stats.patterns.get("webhook → slack"), 2);
        assert_eq!(stats.patterns.distinct(), 1);
    }

    #[test]
    fn test_analyzer_honors_configured_role() {
        let config = AnalyzerConfig::default().with_assistant_role("model");
        let example = Example::new(json!({
            "messages": [{"role": "model", "content": "{\"nodes\": [{\"type\": \"a\"}]}"}]
        }));

        let (_, stats) = Analyzer::from_config(&config).analyze_examples(&[example]);
        assert_eq!(stats.node_types.get("a"), 1);
    }

    #[test]
    fn test_analyzer_flags_overly_deep_examples() {
        let config = AnalyzerConfig::default().with_max_depth(2);
        let examples = vec![
            Example::new(json!({"a": {"b": {"c": 1}}})),
            Example::new(json!({"a": {"b": {"c": 1}}})),
        ];

        let analyzer = Analyzer::from_config(&config);
        let (classification, _) = analyzer.analyze_examples(&examples);
        assert_eq!(classification.flagged_indices(), &[0, 1]);
        assert_eq!(classification.duplicate_count(), 0);
        assert_eq!(analyzer.dedupe(&examples).retained(), 2);
    }

    #[test]
    fn test_dedupe_file_writes_only_first_occurrences() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("dataset_a.json");
        let examples = vec![
            workflow_example(&["a.x", "b.y"]),
            workflow_example(&["c.z"]),
            workflow_example(&["a.x", "b.y"]),
        ];
        fs::write(&input, serde_json::to_string(&examples).unwrap()).unwrap();

        let output = default_output_path(&input, &AnalyzerConfig::default());
        let report = Analyzer::default().dedupe_file(&input, &output).unwrap();

        assert_eq!(report.original, 3);
        assert_eq!(report.deduplicated, 2);
        assert_eq!(report.removed, 1);
        assert_eq!(output, dir.path().join("dataset_a_deduped.json"));

        let written = load_dataset(&output).unwrap();
        assert_eq!(written.examples, vec![examples[0].clone(), examples[1].clone()]);
    }

    #[test]
    fn test_dedupe_file_does_not_write_on_parse_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("dataset_bad.json");
        fs::write(&input, "[{").unwrap();
        let output = dir.path().join("dataset_bad_deduped.json");

        assert!(Analyzer::default().dedupe_file(&input, &output).is_err());
        assert!(!output.exists());
    }
}
