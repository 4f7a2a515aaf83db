//! Multi-file analysis runs.
//!
//! A run analyzes each selected file in order, then asks the caller whether
//! deduplicated copies should be written. The question is answered by an
//! injected closure; this module never prompts.

use std::path::{Path, PathBuf};

use chrono::Utc;

use super::report::{DatasetReport, DedupeReport, FileFailure, RunReport, RunSummary};
use super::{default_output_path, Analyzer};
use crate::config::AnalyzerConfig;

/// Progress notifications emitted while a run executes.
#[derive(Debug, Clone, Copy)]
pub enum RunEvent<'a> {
    /// A file was analyzed.
    Analyzed(&'a DatasetReport),
    /// A file was skipped because of a file-level error.
    Failed(&'a FileFailure),
    /// Every file has been analyzed; emitted only when more than one succeeded.
    Summary(&'a RunSummary),
    /// A deduplicated copy was written.
    Deduplicated(&'a DedupeReport),
}

/// Analyzes `files` and optionally writes deduplicated copies.
///
/// Each file is processed completely before the next one starts and keeps
/// its own duplicate index and statistics. `decide` is called once, after
/// all files were analyzed, and only if at least one file succeeded; when it
/// returns `true` every analyzed file is re-read and deduplicated.
pub fn run_analysis<E, D>(
    analyzer: &Analyzer,
    config: &AnalyzerConfig,
    files: &[PathBuf],
    mut on_event: E,
    decide: D,
) -> RunReport
where
    E: FnMut(RunEvent<'_>),
    D: FnOnce(&RunSummary) -> bool,
{
    let mut datasets = Vec::new();
    let mut failures = Vec::new();
    let mut analyzed_paths = Vec::new();

    for path in files {
        match analyzer.analyze_file(path) {
            Ok(analysis) => {
                let report =
                    DatasetReport::from_analysis(&analysis, config.top_k, config.duplicate_preview);
                on_event(RunEvent::Analyzed(&report));
                datasets.push(report);
                analyzed_paths.push(path.clone());
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Failed to analyze dataset, skipping");
                let failure = FileFailure {
                    path: path.clone(),
                    error: e.to_string(),
                };
                on_event(RunEvent::Failed(&failure));
                failures.push(failure);
            }
        }
    }

    let summary: RunSummary = datasets.iter().collect();
    if summary.total_files > 1 {
        on_event(RunEvent::Summary(&summary));
    }

    let mut deduplicated = Vec::new();
    if !analyzed_paths.is_empty() && decide(&summary) {
        for path in &analyzed_paths {
            match dedupe_one(analyzer, config, path) {
                Ok(report) => {
                    on_event(RunEvent::Deduplicated(&report));
                    deduplicated.push(report);
                }
                Err(failure) => {
                    on_event(RunEvent::Failed(&failure));
                    failures.push(failure);
                }
            }
        }
    }

    RunReport {
        generated_at: Utc::now(),
        datasets,
        failures,
        summary,
        deduplicated,
    }
}

fn dedupe_one(
    analyzer: &Analyzer,
    config: &AnalyzerConfig,
    path: &Path,
) -> Result<DedupeReport, FileFailure> {
    let output = default_output_path(path, config);
    analyzer.dedupe_file(path, &output).map_err(|e| {
        tracing::warn!(file = %path.display(), error = %e, "Failed to write deduplicated dataset");
        FileFailure {
            path: path.to_path_buf(),
            error: e.to_string(),
        }
    })
}
