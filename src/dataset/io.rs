//! Loading dataset files and writing deduplicated copies.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;

use super::example::Example;
use crate::error::DatasetError;

/// A dataset file read fully into memory.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub path: PathBuf,
    pub examples: Vec<Example>,
    /// Size of the file on disk, in bytes.
    pub size_bytes: u64,
}

impl LoadedDataset {
    /// File name used in reports.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Reads a dataset file containing a single top-level JSON array of examples.
///
/// # Errors
///
/// Returns a [`DatasetError`] if the file cannot be read, is not valid JSON,
/// or its top level is not an array.
pub fn load_dataset(path: &Path) -> Result<LoadedDataset, DatasetError> {
    let bytes = fs::read(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_json::from_slice(&bytes).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(DatasetError::NotAnArray {
                path: path.to_path_buf(),
                found: json_kind(&other),
            })
        }
    };

    tracing::debug!(path = %path.display(), examples = items.len(), "Loaded dataset");

    Ok(LoadedDataset {
        path: path.to_path_buf(),
        examples: items.into_iter().map(Example::new).collect(),
        size_bytes: bytes.len() as u64,
    })
}

/// Writes examples as a pretty-printed JSON array, replacing `path` atomically.
///
/// The data goes to a temporary file in the destination directory first and
/// is renamed into place only after it has been fully written, so a failed
/// write never leaves a truncated dataset behind.
pub fn write_dataset(path: &Path, examples: &[Example]) -> Result<(), DatasetError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let write_err = |reason: String| DatasetError::Write {
        path: path.to_path_buf(),
        reason,
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, examples)?;
        writer.flush().map_err(|e| write_err(e.to_string()))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| write_err(e.to_string()))?;
    temp.persist(path).map_err(|e| write_err(e.error.to_string()))?;

    tracing::debug!(path = %path.display(), examples = examples.len(), "Wrote dataset");
    Ok(())
}

/// Path of the deduplicated copy: `<stem><suffix>.json` next to the input.
pub fn deduped_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    input.with_file_name(format!("{stem}{suffix}.json"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
