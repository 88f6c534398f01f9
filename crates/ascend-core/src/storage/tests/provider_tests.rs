use std::path::Path;

use tempfile::tempdir;

use crate::storage::error::StorageSystemError;
use crate::storage::local::LocalStorageProvider;
use crate::storage::provider::StorageProvider;

#[test]
fn local_provider_write_then_read_round_trip() {
    let dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new();
    let file = dir.path().join("note.txt");

    provider
        .write_string(&file, "hello storage")
        .expect("write_string failed");
    assert!(provider.exists(&file));
    assert!(provider.is_file(&file));
    assert!(!provider.is_dir(&file));

    let content = provider.read_to_string(&file).expect("read_to_string failed");
    assert_eq!(content, "hello storage");
}

#[test]
fn local_provider_read_missing_file_is_not_found() {
    let provider = LocalStorageProvider::new();
    let result = provider.read_to_string(Path::new("/nonexistent/ascend-test-missing.txt"));
    assert!(matches!(result, Err(StorageSystemError::FileNotFound(_))));
}

#[test]
fn local_provider_create_dir_all_and_list() {
    let dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new();
    let nested = dir.path().join("a").join("b");

    provider.create_dir_all(&nested).expect("create_dir_all failed");
    assert!(provider.is_dir(&nested));

    provider
        .write_string(&nested.join("one.json"), "{}")
        .expect("write_string failed");
    provider
        .write_string(&nested.join("two.json"), "{}")
        .expect("write_string failed");

    let mut entries = provider.read_dir(&nested).expect("read_dir failed");
    entries.sort();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].ends_with("one.json"));
    assert!(entries[1].ends_with("two.json"));
}

#[test]
fn local_provider_reports_name() {
    assert_eq!(LocalStorageProvider::new().name(), "local");
}
