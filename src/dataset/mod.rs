//! Dataset files: example views, discovery, loading and writing.

pub mod discovery;
pub mod example;
pub mod io;

pub use discovery::{
    discover_datasets, resolve_selection, DatasetSelection, FilePattern, DEFAULT_FILE_PATTERN,
};
pub use example::{Example, Message, MESSAGES_FIELD};
pub use io::{deduped_output_path, load_dataset, write_dataset, LoadedDataset};
