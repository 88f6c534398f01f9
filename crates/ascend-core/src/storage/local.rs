use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::error::StorageSystemError;
use crate::storage::provider::{StorageProvider, StorageResult};

/// Storage provider backed by the local filesystem.
#[derive(Debug, Default, Clone)]
pub struct LocalStorageProvider;

impl LocalStorageProvider {
    pub fn new() -> Self {
        Self
    }
}

impl StorageProvider for LocalStorageProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> StorageResult<String> {
        if !path.exists() {
            return Err(StorageSystemError::FileNotFound(path.to_path_buf()));
        }
        fs::read_to_string(path)
            .map_err(|e| StorageSystemError::io(e, "read_to_string", path.to_path_buf()))
    }

    fn write_string(&self, path: &Path, content: &str) -> StorageResult<()> {
        fs::write(path, content)
            .map_err(|e| StorageSystemError::io(e, "write_string", path.to_path_buf()))
    }

    fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
        fs::create_dir_all(path)
            .map_err(|e| StorageSystemError::io(e, "create_dir_all", path.to_path_buf()))
    }

    fn read_dir(&self, path: &Path) -> StorageResult<Vec<PathBuf>> {
        let entries = fs::read_dir(path)
            .map_err(|e| StorageSystemError::io(e, "read_dir", path.to_path_buf()))?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| StorageSystemError::io(e, "read_dir", path.to_path_buf()))?;
            paths.push(entry.path());
        }
        Ok(paths)
    }
}
