use std::path::{Path, PathBuf};

use crate::storage::error::StorageSystemError;

/// Result alias local to storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageSystemError>;

/// Abstraction over the file operations the configuration subsystem performs.
///
/// Implementations are expected to be cheap to share behind an `Arc`; all
/// methods take `&self` and implementations hold no mutable state.
pub trait StorageProvider: Send + Sync {
    /// Provider name for diagnostics
    fn name(&self) -> &str;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Read the entire contents of a file as a UTF-8 string
    fn read_to_string(&self, path: &Path) -> StorageResult<String>;

    /// Write a string to a file, replacing any existing content
    fn write_string(&self, path: &Path, content: &str) -> StorageResult<()>;

    /// Create a directory and all missing parents
    fn create_dir_all(&self, path: &Path) -> StorageResult<()>;

    /// List the entries of a directory
    fn read_dir(&self, path: &Path) -> StorageResult<Vec<PathBuf>>;
}
