//! Reports for analyzed datasets, the cross-file summary, and dedupe results.
//!
//! Reports are plain serializable structs so the CLI can emit them as JSON;
//! the `render` methods produce the human-readable console form.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::DatasetAnalysis;
use crate::dataset::Example;
use crate::dedup::DedupeOutcome;
use crate::workflow::{type_suffix, RankedEntry};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Width of the section rule lines.
const RULE_WIDTH: usize = 60;

/// Report for one analyzed dataset file.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport {
    pub file: String,
    pub total_examples: usize,
    pub size_bytes: u64,
    pub unique_examples: usize,
    pub duplicates: usize,
    /// Percentage of examples that repeat an earlier one.
    pub duplicate_rate: f64,
    pub unfingerprintable: usize,
    pub payloads_found: usize,
    pub payloads_absent: usize,
    pub distinct_node_types: usize,
    pub distinct_patterns: usize,
    /// Requested table length; the tables may hold fewer entries.
    pub top_k: usize,
    pub top_node_types: Vec<RankedEntry>,
    pub top_patterns: Vec<RankedEntry>,
    /// The first few duplicate indices.
    pub duplicate_indices: Vec<usize>,
    /// Duplicates beyond those listed in `duplicate_indices`.
    pub more_duplicates: usize,
}

impl DatasetReport {
    /// Builds a report keeping `top_k` table entries and `preview` duplicate indices.
    pub fn from_analysis(analysis: &DatasetAnalysis, top_k: usize, preview: usize) -> Self {
        let classification = &analysis.classification;
        let total = classification.len();
        let duplicates = classification.duplicate_count();
        let listed: Vec<usize> = classification
            .duplicate_indices()
            .iter()
            .take(preview)
            .copied()
            .collect();

        Self {
            file: analysis.file_name.clone(),
            total_examples: total,
            size_bytes: analysis.size_bytes,
            unique_examples: total - duplicates,
            duplicates,
            duplicate_rate: percentage(duplicates, total),
            unfingerprintable: classification.flagged_indices().len(),
            payloads_found: analysis.stats.payloads_found,
            payloads_absent: analysis.stats.payloads_absent,
            distinct_node_types: analysis.stats.node_types.distinct(),
            distinct_patterns: analysis.stats.patterns.distinct(),
            top_k,
            top_node_types: ranked(analysis.stats.node_types.top(top_k)),
            top_patterns: ranked(analysis.stats.patterns.top(top_k)),
            more_duplicates: duplicates - listed.len(),
            duplicate_indices: listed,
        }
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }

    /// Renders the console form of the report.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(RULE_WIDTH);

        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "📊 Analyzing: {}", self.file);
        let _ = writeln!(out, "{rule}");

        let _ = writeln!(out, "\n📈 Statistics:");
        let _ = writeln!(out, "   Total Examples: {}", group_thousands(self.total_examples));
        let _ = writeln!(out, "   File Size: {:.2} MB", self.size_mb());
        let _ = writeln!(out, "   Unique Examples: {}", group_thousands(self.unique_examples));
        let _ = writeln!(
            out,
            "   Duplicates: {} ({:.1}%)",
            group_thousands(self.duplicates),
            self.duplicate_rate
        );
        if self.unfingerprintable > 0 {
            let _ = writeln!(
                out,
                "   Unfingerprintable: {} (excluded from duplicate detection)",
                group_thousands(self.unfingerprintable)
            );
        }
        if self.payloads_absent > 0 {
            let _ = writeln!(
                out,
                "   Without Workflow: {}",
                group_thousands(self.payloads_absent)
            );
        }

        let _ = writeln!(out, "\n🔧 Top {} Node Types:", self.top_k);
        for entry in &self.top_node_types {
            let _ = writeln!(
                out,
                "   {:<30} {:>5} uses",
                type_suffix(&entry.label),
                group_thousands(entry.count)
            );
        }

        let _ = writeln!(out, "\n🔀 Top {} Workflow Patterns:", self.top_k);
        for entry in &self.top_patterns {
            let _ = writeln!(
                out,
                "   {:<40} {:>4} workflows",
                entry.label,
                group_thousands(entry.count)
            );
        }

        if self.duplicates > 0 {
            let _ = writeln!(
                out,
                "\n⚠️  Duplicate Example Indices (first {}):",
                self.duplicate_indices.len()
            );
            for index in &self.duplicate_indices {
                let _ = writeln!(out, "   Index {index}");
            }
            if self.more_duplicates > 0 {
                let _ = writeln!(out, "   ... and {} more", self.more_duplicates);
            }
        }

        out
    }
}

/// Additive totals across every successfully analyzed file.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RunSummary {
    pub total_files: usize,
    pub total_examples: usize,
    pub total_duplicates: usize,
    pub total_size_bytes: u64,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one file's totals.
    pub fn add(&mut self, report: &DatasetReport) {
        self.total_files += 1;
        self.total_examples += report.total_examples;
        self.total_duplicates += report.duplicates;
        self.total_size_bytes += report.size_bytes;
    }

    /// Overall duplicate percentage.
    pub fn duplicate_rate(&self) -> f64 {
        percentage(self.total_duplicates, self.total_examples)
    }

    pub fn total_size_mb(&self) -> f64 {
        self.total_size_bytes as f64 / BYTES_PER_MB
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(RULE_WIDTH);

        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "📊 Overall Summary");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "   Total Files: {}", self.total_files);
        let _ = writeln!(out, "   Total Examples: {}", group_thousands(self.total_examples));
        let _ = writeln!(out, "   Total Duplicates: {}", group_thousands(self.total_duplicates));
        let _ = writeln!(out, "   Total Size: {:.2} MB", self.total_size_mb());
        let _ = writeln!(out, "   Duplicate Rate: {:.1}%", self.duplicate_rate());

        out
    }
}

impl<'a> FromIterator<&'a DatasetReport> for RunSummary {
    fn from_iter<I: IntoIterator<Item = &'a DatasetReport>>(iter: I) -> Self {
        let mut summary = Self::new();
        for report in iter {
            summary.add(report);
        }
        summary
    }
}

/// Full output of an `analyze` run, used for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub datasets: Vec<DatasetReport>,
    /// Files that could not be loaded, with the error message.
    pub failures: Vec<FileFailure>,
    pub summary: RunSummary,
    pub deduplicated: Vec<DedupeReport>,
}

/// A file skipped because of a file-level error.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Result of writing a deduplicated copy of a dataset.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DedupeReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub original: usize,
    pub deduplicated: usize,
    pub removed: usize,
}

impl DedupeReport {
    pub fn new(input: &Path, output: &Path, outcome: &DedupeOutcome<Example>) -> Self {
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            original: outcome.total_before,
            deduplicated: outcome.retained(),
            removed: outcome.removed(),
        }
    }

    /// Percentage of examples removed.
    pub fn removed_rate(&self) -> f64 {
        percentage(self.removed, self.original)
    }

    pub fn render(&self) -> String {
        let name = self
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.output.display().to_string());

        let mut out = String::new();
        let _ = writeln!(out, "\n✅ Created deduplicated file: {name}");
        let _ = writeln!(out, "   Original: {} examples", group_thousands(self.original));
        let _ = writeln!(out, "   Deduplicated: {} examples", group_thousands(self.deduplicated));
        let _ = writeln!(
            out,
            "   Removed: {} duplicates ({:.1}%)",
            group_thousands(self.removed),
            self.removed_rate()
        );
        out
    }
}

/// `part / whole` as a percentage, zero for an empty whole.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Formats an integer with `,` thousands separators.
pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn ranked(entries: Vec<(String, usize)>) -> Vec<RankedEntry> {
    entries.into_iter().map(RankedEntry::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::{Fingerprint, FingerprintIndex};
    use crate::workflow::WorkflowStats;

    /// Analysis whose fingerprints are given as labels, in input order.
    fn analysis_of(labels: &[&str]) -> DatasetAnalysis {
        let mut index = FingerprintIndex::new();
        for label in labels {
            index.observe(Fingerprint::from_canonical(label));
        }
        DatasetAnalysis {
            path: PathBuf::from("datasets/dataset_test.json"),
            file_name: "dataset_test.json".to_string(),
            size_bytes: 3 * 1024 * 1024,
            classification: index.into_classification(),
            stats: WorkflowStats::new(),
        }
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 0), 0.0);
        assert!((percentage(1, 4) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_duplicate_preview_is_truncated() {
        // Position 0 registers the fingerprint; positions 1..=12 repeat it.
        let analysis = analysis_of(&["dup"; 13]);

        let report = DatasetReport::from_analysis(&analysis, 10, 10);
        assert_eq!(report.duplicates, 12);
        assert_eq!(report.unique_examples, 1);
        assert_eq!(report.duplicate_indices, (1..=10).collect::<Vec<_>>());
        assert_eq!(report.more_duplicates, 2);

        let text = report.render();
        assert!(text.contains("Index 10"));
        assert!(!text.contains("Index 11\n"));
        assert!(text.contains("... and 2 more"));
    }

    #[test]
    fn test_report_render_shows_suffixes() {
        let mut analysis = analysis_of(&["a", "b", "c", "d"]);
        analysis.stats.node_types.add("n8n-nodes-base.httpRequest", 3);
        analysis.stats.patterns.add("webhook → httpRequest", 2);

        let report = DatasetReport::from_analysis(&analysis, 10, 10);
        let text = report.render();

        assert!(text.contains("📊 Analyzing: dataset_test.json"));
        assert!(text.contains("Total Examples: 4"));
        assert!(text.contains("File Size: 3.00 MB"));
        assert!(text.contains("Duplicates: 0 (0.0%)"));
        assert!(text.contains("   httpRequest"));
        assert!(!text.contains("n8n-nodes-base.httpRequest"));
        assert!(text.contains("webhook → httpRequest"));
        assert!(!text.contains("Duplicate Example Indices"));
    }

    #[test]
    fn test_table_headings_use_requested_length() {
        let mut analysis = analysis_of(&["a"]);
        for label in ["n8n.start", "n8n.set", "n8n.slack"] {
            analysis.stats.node_types.increment(label);
        }
        analysis.stats.patterns.increment("start → slack");

        let report = DatasetReport::from_analysis(&analysis, 10, 10);
        assert_eq!(report.top_node_types.len(), 3);

        let text = report.render();
        assert!(text.contains("🔧 Top 10 Node Types:"));
        assert!(text.contains("🔀 Top 10 Workflow Patterns:"));
        assert!(!text.contains("Top 3"));

        let text = DatasetReport::from_analysis(&analysis, 2, 10).render();
        assert!(text.contains("🔧 Top 2 Node Types:"));
    }

    #[test]
    fn test_run_summary_totals() {
        let a = DatasetReport::from_analysis(&analysis_of(&["a", "b", "c", "d"]), 10, 10);
        let mut b = a.clone();
        b.total_examples = 6;
        b.duplicates = 2;

        let summary: RunSummary = [&a, &b].into_iter().collect();
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.total_examples, 10);
        assert_eq!(summary.total_duplicates, 2);
        assert!((summary.duplicate_rate() - 20.0).abs() < 1e-10);
        assert!((summary.total_size_mb() - 6.0).abs() < 1e-10);

        let text = summary.render();
        assert!(text.contains("Total Files: 2"));
        assert!(text.contains("Duplicate Rate: 20.0%"));
    }

    #[test]
    fn test_dedupe_report() {
        let report = DedupeReport {
            input: PathBuf::from("d/dataset_a.json"),
            output: PathBuf::from("d/dataset_a_deduped.json"),
            original: 2000,
            deduplicated: 1500,
            removed: 500,
        };

        assert!((report.removed_rate() - 25.0).abs() < 1e-10);
        let text = report.render();
        assert!(text.contains("Created deduplicated file: dataset_a_deduped.json"));
        assert!(text.contains("Original: 2,000 examples"));
        assert!(text.contains("Removed: 500 duplicates (25.0%)"));
    }
}
