//! Locating dataset files on disk.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use walkdir::WalkDir;

use crate::error::DatasetError;

/// Default naming convention for dataset files.
pub const DEFAULT_FILE_PATTERN: &str = "dataset_*.json";

/// A shell-style file-name pattern (`*`, `?`, `[abc]`, `{a,b}`).
#[derive(Debug, Clone)]
pub struct FilePattern {
    raw: String,
    matcher: GlobMatcher,
}

impl FilePattern {
    /// Compiles a glob matched against bare file names.
    pub fn new(pattern: &str) -> Result<Self, DatasetError> {
        if pattern.is_empty() {
            return Err(DatasetError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern cannot be empty".to_string(),
            });
        }

        let glob = Glob::new(pattern).map_err(|e| DatasetError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            raw: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.matcher.is_match(file_name)
    }
}

impl Default for FilePattern {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_PATTERN).expect("default pattern is valid")
    }
}

/// Which dataset files a run should analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSelection {
    /// A single file, by path or by name inside the dataset directory.
    Named(PathBuf),
    /// Every file in the dataset directory matching the pattern.
    All,
}

/// Lists the files in `dir` (non-recursively) whose names match `pattern`, sorted by name.
///
/// # Errors
///
/// Returns [`DatasetError::DirectoryNotFound`] if `dir` is not a directory.
pub fn discover_datasets(dir: &Path, pattern: &FilePattern) -> Result<Vec<PathBuf>, DatasetError> {
    if !dir.is_dir() {
        return Err(DatasetError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Failed to read directory entry, skipping");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let matched = pattern.matches(&entry.file_name().to_string_lossy());
        if matched {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Resolves a selection into the list of files to analyze.
///
/// A named file is used as-is when it exists on its own; otherwise it is
/// looked up inside `dir`, which must then exist.
pub fn resolve_selection(
    selection: &DatasetSelection,
    dir: &Path,
    pattern: &FilePattern,
) -> Result<Vec<PathBuf>, DatasetError> {
    match selection {
        DatasetSelection::Named(name) if name.is_file() => Ok(vec![name.clone()]),
        DatasetSelection::Named(name) => {
            if !dir.is_dir() {
                return Err(DatasetError::DirectoryNotFound(dir.to_path_buf()));
            }
            Ok(vec![dir.join(name)])
        }
        DatasetSelection::All => discover_datasets(dir, pattern),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_pattern() {
        let pattern = FilePattern::default();
        assert!(pattern.matches("dataset_forum.json"));
        assert!(pattern.matches("dataset_.json"));
        assert!(!pattern.matches("dataset_forum.json.bak"));
        assert!(!pattern.matches("other.json"));
        assert!(!pattern.matches("my_dataset_a.json"));
        assert_eq!(pattern.as_str(), DEFAULT_FILE_PATTERN);
    }

    #[test]
    fn test_pattern_escapes_literals() {
        let pattern = FilePattern::new("data+?.json").unwrap();
        assert!(pattern.matches("data+1.json"));
        assert!(!pattern.matches("dataa1.json"));
        assert!(!pattern.matches("data+1xjson"));
    }

    #[test]
    fn test_pattern_character_classes() {
        let dir = TempDir::new().unwrap();
        for name in ["dataset_a.json", "dataset_b.json", "dataset_c.json"] {
            fs::write(dir.path().join(name), "[]").unwrap();
        }

        let pattern = FilePattern::new("dataset_[ab].json").unwrap();
        let files = discover_datasets(dir.path(), &pattern).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("dataset_a.json"), dir.path().join("dataset_b.json")]
        );
        assert!(!pattern.matches("dataset_[ab].json"));
    }

    #[test]
    fn test_malformed_glob_rejected() {
        assert!(matches!(
            FilePattern::new("dataset_[a.json"),
            Err(DatasetError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(
            FilePattern::new(""),
            Err(DatasetError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["dataset_b.json", "dataset_a.json", "notes.txt", "dataset_a_deduped.json"] {
            fs::write(dir.path().join(name), "[]").unwrap();
        }
        fs::create_dir(dir.path().join("dataset_dir.json")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("dataset_c.json"), "[]").unwrap();

        let files = discover_datasets(dir.path(), &FilePattern::default()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["dataset_a.json", "dataset_a_deduped.json", "dataset_b.json"]
        );
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = TempDir::new().unwrap();
        let files = discover_datasets(dir.path(), &FilePattern::default()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_discover_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("datasets");
        assert!(matches!(
            discover_datasets(&missing, &FilePattern::default()),
            Err(DatasetError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_named_selection() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("dataset_x.json");
        fs::write(&file, "[]").unwrap();

        let direct = resolve_selection(
            &DatasetSelection::Named(file.clone()),
            Path::new("/nonexistent"),
            &FilePattern::default(),
        )
        .unwrap();
        assert_eq!(direct, vec![file.clone()]);

        let by_name = resolve_selection(
            &DatasetSelection::Named(PathBuf::from("dataset_x.json")),
            dir.path(),
            &FilePattern::default(),
        )
        .unwrap();
        assert_eq!(by_name, vec![file]);
    }
}
