//! CLI command definitions for the workflow dataset analyzer.
//!
//! This module wires the analysis library to the terminal: selecting dataset
//! files, printing reports, and asking before writing deduplicated copies.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use crate::analysis::{default_output_path, run_analysis, Analyzer, RunEvent, RunReport, RunSummary};
use crate::config::AnalyzerConfig;
use crate::dataset::{resolve_selection, DatasetSelection};
use crate::error::DatasetError;

/// Question asked before writing deduplicated copies.
const DEDUPE_PROMPT: &str = "Create deduplicated versions? (y/n): ";

/// Analyze workflow training datasets for duplicates and node statistics.
#[derive(Parser)]
#[command(name = "workflow-dataset-analyzer")]
#[command(about = "Analyze workflow training datasets: statistics, duplicates and patterns")]
#[command(version)]
#[command(
    long_about = "workflow-dataset-analyzer reads JSON datasets of chat-formatted training examples whose assistant message holds a workflow, reports volume, duplicate rate, node type and workflow pattern frequencies, and can write deduplicated copies.\n\nExample usage:\n  workflow-dataset-analyzer analyze\n  workflow-dataset-analyzer analyze dataset_forum.json --no-dedupe\n  workflow-dataset-analyzer dedupe ./datasets/dataset_forum.json"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Analyze one dataset file, or every matching file in the dataset directory.
    #[command(alias = "stats")]
    Analyze(AnalyzeArgs),

    /// Write a deduplicated copy of a single dataset file without prompting.
    Dedupe(DedupeArgs),
}

/// Arguments for the analyze command.
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Dataset file to analyze (a path, or a file name inside the dataset directory).
    /// When omitted, every file matching the pattern is analyzed.
    pub file: Option<String>,

    /// Directory containing dataset files (overrides ANALYZER_DATASET_DIR).
    #[arg(short = 'd', long)]
    pub dataset_dir: Option<String>,

    /// File name glob for dataset discovery (overrides ANALYZER_FILE_PATTERN).
    #[arg(short = 'p', long)]
    pub pattern: Option<String>,

    /// Number of entries in each top-K table (overrides ANALYZER_TOP_K).
    #[arg(long)]
    pub top: Option<usize>,

    /// Output the run report as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Write deduplicated copies without asking.
    #[arg(long)]
    pub dedupe: bool,

    /// Never write deduplicated copies.
    #[arg(long, conflicts_with = "dedupe")]
    pub no_dedupe: bool,
}

/// Arguments for the dedupe command.
#[derive(Parser, Debug)]
pub struct DedupeArgs {
    /// Dataset file to deduplicate.
    pub file: String,

    /// Output path (default: `<stem>_deduped.json` next to the input).
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Output the result as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// How the analyze command decides whether to write deduplicated copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    Always,
    Never,
    Prompt,
}

impl WritePolicy {
    /// Explicit flags win; JSON output never prompts since stdout carries the report.
    pub fn from_args(args: &AnalyzeArgs) -> Self {
        if args.dedupe {
            WritePolicy::Always
        } else if args.no_dedupe || args.json {
            WritePolicy::Never
        } else {
            WritePolicy::Prompt
        }
    }
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli())
}

/// Run the CLI with the parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Analyze(args) => run_analyze_command(args),
        Commands::Dedupe(args) => run_dedupe_command(args),
    }
}

/// Layers command-line overrides on top of the environment configuration.
fn build_config(args: &AnalyzeArgs) -> anyhow::Result<AnalyzerConfig> {
    let mut config = AnalyzerConfig::from_env().context("Invalid analyzer configuration")?;

    if let Some(dir) = &args.dataset_dir {
        config = config.with_dataset_dir(dir);
    }
    if let Some(pattern) = &args.pattern {
        config = config.with_file_pattern(pattern);
    }
    if let Some(top) = args.top {
        config = config.with_top_k(top);
    }

    config.validate().context("Invalid analyzer configuration")?;
    Ok(config)
}

fn run_analyze_command(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;
    let policy = WritePolicy::from_args(&args);
    let mut stdout = io::stdout();
    execute_analyze(&args, &config, &mut stdout, |_| decide(policy))?;
    Ok(())
}

/// Selects dataset files, analyzes them, and writes the console or JSON output to `out`.
///
/// Returns `None` when the selection is empty or the dataset directory is missing.
fn execute_analyze<W, D>(
    args: &AnalyzeArgs,
    config: &AnalyzerConfig,
    out: &mut W,
    decide: D,
) -> anyhow::Result<Option<RunReport>>
where
    W: Write,
    D: FnOnce(&RunSummary) -> bool,
{
    let pattern = config.pattern()?;

    let selection = match &args.file {
        Some(file) => DatasetSelection::Named(PathBuf::from(file)),
        None => DatasetSelection::All,
    };

    let files = match resolve_selection(&selection, &config.dataset_dir, &pattern) {
        Ok(files) => files,
        Err(DatasetError::DirectoryNotFound(dir)) => {
            warn!(dir = %dir.display(), "Datasets directory not found");
            let message = format!("Datasets directory not found: {}", dir.display());
            write_empty_run(out, args.json, &message)?;
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    if files.is_empty() {
        warn!(dir = %config.dataset_dir.display(), pattern = %pattern.as_str(), "No dataset files found");
        write_empty_run(out, args.json, "No dataset files found")?;
        return Ok(None);
    }

    info!(count = files.len(), "Found dataset files");
    if !args.json {
        writeln!(out, "\n🔍 Workflow Dataset Analyzer")?;
        writeln!(out, "Found {} dataset file(s)", files.len())?;
    }

    let analyzer = Analyzer::from_config(config);
    let json = args.json;
    let mut write_error = None;

    let report = run_analysis(
        &analyzer,
        config,
        &files,
        |event| {
            if json || write_error.is_some() {
                return;
            }
            if let Err(e) = write_event(&mut *out, event) {
                write_error = Some(e);
            }
        },
        decide,
    );

    if let Some(e) = write_error {
        return Err(e.into());
    }

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write_footer(out, &report)?;
    }

    Ok(Some(report))
}

fn run_dedupe_command(args: DedupeArgs) -> anyhow::Result<()> {
    let config = AnalyzerConfig::from_env().context("Invalid analyzer configuration")?;
    let input = PathBuf::from(&args.file);
    let output = match &args.output {
        Some(output) => PathBuf::from(output),
        None => default_output_path(&input, &config),
    };

    let report = Analyzer::from_config(&config)
        .dedupe_file(&input, &output)
        .with_context(|| format!("Failed to deduplicate {}", input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }

    Ok(())
}

fn write_empty_run<W: Write>(out: &mut W, json: bool, message: &str) -> io::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::json!({"status": "empty", "message": message}))
    } else {
        writeln!(out, "❌ {message}")
    }
}

fn write_event<W: Write>(out: &mut W, event: RunEvent<'_>) -> io::Result<()> {
    match event {
        RunEvent::Analyzed(report) => write!(out, "{}", report.render()),
        RunEvent::Failed(failure) => writeln!(out, "❌ Error loading {}: {}", failure.path.display(), failure.error),
        RunEvent::Summary(summary) => write!(out, "{}", summary.render()),
        RunEvent::Deduplicated(report) => write!(out, "{}", report.render()),
    }
}

fn write_footer<W: Write>(out: &mut W, report: &RunReport) -> io::Result<()> {
    let rule = "=".repeat(60);
    if !report.deduplicated.is_empty() {
        writeln!(out, "\n✅ Deduplication complete!")?;
    }
    writeln!(out, "\n{rule}")?;
    writeln!(out, "Analysis complete! 🎉")?;
    writeln!(out, "{rule}\n")
}

/// Resolves the write policy, prompting on the terminal if needed.
fn decide(policy: WritePolicy) -> bool {
    match policy {
        WritePolicy::Always => true,
        WritePolicy::Never => false,
        WritePolicy::Prompt => {
            println!("\n{}", "=".repeat(60));
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            confirm(&mut stdin.lock(), &mut stdout, DEDUPE_PROMPT).unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read confirmation, not writing");
                false
            })
        }
    }
}

/// Asks a yes/no question; only an answer of `y` (any case) accepts.
pub fn confirm<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, question: &str) -> io::Result<bool> {
    write!(writer, "{question}")?;
    writer.flush()?;

    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
