use std::path::Path;

use serde_json::json;
use tempfile::tempdir;

use crate::config::error::ConfigSystemError;
use crate::config::loader::{ConfigLoader, EXTENDS_KEY};
use crate::config::parser::ConfigFormat;

fn write(path: &Path, content: &str) {
    std::fs::write(path, content).expect("Failed to write test config");
}

#[test]
fn load_reads_and_parses_a_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("config.json");
    write(
        &path,
        r#"{"version": "1.0.0", "framework": "ascend", "extra": 7}"#,
    );

    let loader = ConfigLoader::default();
    let doc = loader.load(&path, false, false).expect("load failed");
    assert_eq!(doc.get("extra"), Some(&json!(7)));
}

#[test]
fn cached_load_survives_file_change_until_reload() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("config.json");
    write(&path, r#"{"version": "1.0.0", "framework": "ascend", "n": 1}"#);

    let loader = ConfigLoader::default();
    let first = loader.load(&path, false, true).expect("first load failed");
    assert_eq!(first.get("n"), Some(&json!(1)));
    assert_eq!(loader.cached_paths().len(), 1);

    write(&path, r#"{"version": "1.0.0", "framework": "ascend", "n": 2}"#);

    let cached = loader.load(&path, false, true).expect("cached load failed");
    assert_eq!(cached.get("n"), Some(&json!(1)), "cache must shield the change");

    let fresh = loader.reload(&path, false).expect("reload failed");
    assert_eq!(fresh.get("n"), Some(&json!(2)));
}

#[test]
fn clear_cache_forces_a_fresh_read() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("config.json");
    write(&path, r#"{"version": "1.0.0", "framework": "ascend", "n": 1}"#);

    let loader = ConfigLoader::default();
    let _ = loader.load(&path, false, true).expect("load failed");
    write(&path, r#"{"version": "1.0.0", "framework": "ascend", "n": 2}"#);

    loader.clear_cache();
    assert!(loader.cached_paths().is_empty());
    let fresh = loader.load(&path, false, true).expect("load failed");
    assert_eq!(fresh.get("n"), Some(&json!(2)));
}

#[test]
fn inheritance_merges_child_over_base_and_strips_marker() {
    let dir = tempdir().expect("Failed to create temp directory");
    write(
        &dir.path().join("base.json"),
        r#"{
            "version": "1.0.0",
            "framework": "ascend",
            "training": {"total_timesteps": 100000, "log_dir": "./logs"}
        }"#,
    );
    let child = dir.path().join("child.json");
    write(
        &child,
        r#"{
            "_extends": "base.json",
            "version": "1.0.0",
            "framework": "ascend",
            "training": {"total_timesteps": 500000}
        }"#,
    );

    let loader = ConfigLoader::default();
    let doc = loader.load(&child, false, false).expect("load failed");

    assert!(!doc.contains_key(EXTENDS_KEY));
    assert_eq!(
        doc.get("training"),
        Some(&json!({"total_timesteps": 500000, "log_dir": "./logs"}))
    );
}

#[test]
fn inheritance_is_transitive_over_three_levels() {
    let dir = tempdir().expect("Failed to create temp directory");
    write(
        &dir.path().join("grandparent.json"),
        r#"{"version": "1.0.0", "framework": "ascend", "a": 1, "b": 1, "c": 1}"#,
    );
    write(
        &dir.path().join("parent.json"),
        r#"{"_extends": "grandparent.json", "version": "1.0.0", "framework": "ascend", "b": 2, "c": 2}"#,
    );
    let child = dir.path().join("child.json");
    write(
        &child,
        r#"{"_extends": "parent.json", "version": "1.0.0", "framework": "ascend", "c": 3}"#,
    );

    let loader = ConfigLoader::default();
    let doc = loader.load(&child, false, false).expect("load failed");

    assert_eq!(doc.get("a"), Some(&json!(1)));
    assert_eq!(doc.get("b"), Some(&json!(2)));
    assert_eq!(doc.get("c"), Some(&json!(3)));
}

#[test]
fn circular_inheritance_is_detected() {
    let dir = tempdir().expect("Failed to create temp directory");
    write(
        &dir.path().join("a.json"),
        r#"{"_extends": "b.json", "version": "1.0.0", "framework": "ascend"}"#,
    );
    write(
        &dir.path().join("b.json"),
        r#"{"_extends": "a.json", "version": "1.0.0", "framework": "ascend"}"#,
    );

    let loader = ConfigLoader::default();
    let result = loader.load(&dir.path().join("a.json"), false, false);
    match result {
        Err(ConfigSystemError::CircularInheritance { chain }) => {
            assert!(chain.len() >= 3);
        }
        other => panic!("expected circular inheritance error, got {other:?}"),
    }
}

#[test]
fn non_string_extends_is_structural_error() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("bad.json");
    write(
        &path,
        r#"{"_extends": 12, "version": "1.0.0", "framework": "ascend"}"#,
    );

    let loader = ConfigLoader::default();
    let result = loader.load(&path, false, false);
    assert!(matches!(result, Err(ConfigSystemError::Structural { .. })));
}

#[test]
fn validation_failure_aggregates_all_errors() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("config.json");
    // two rule violations on top of a structurally valid document
    write(
        &path,
        r#"{
            "version": "1.0.0",
            "framework": "ascend",
            "agent": {"type": "dqn"},
            "environment": {"type": ""},
            "training": {"total_timesteps": 10}
        }"#,
    );

    let loader = ConfigLoader::default();
    let result = loader.load(&path, true, false);
    match result {
        Err(ConfigSystemError::ValidationFailed { errors, .. }) => {
            assert_eq!(errors.len(), 2, "errors: {errors:?}");
        }
        other => panic!("expected aggregated validation failure, got {other:?}"),
    }
}

#[test]
fn default_document_passes_validation() {
    let loader = ConfigLoader::default();
    let default = loader.create_default();
    let text = serde_json::to_string(&default).expect("serialize failed");

    loader
        .load_from_str(&text, ConfigFormat::Json, true)
        .expect("default config must validate cleanly");
}

#[test]
fn save_default_writes_a_loadable_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("default.json");

    let loader = ConfigLoader::default();
    loader.save_default(&path).expect("save_default failed");
    let doc = loader.load(&path, true, false).expect("round-trip load failed");
    assert_eq!(doc.get("framework"), Some(&json!("ascend")));
}

#[cfg(feature = "yaml-config")]
#[test]
fn yaml_and_json_documents_are_interchangeable() {
    let dir = tempdir().expect("Failed to create temp directory");
    write(
        &dir.path().join("base.yaml"),
        "version: \"1.0.0\"\nframework: ascend\ntraining:\n  total_timesteps: 100000\n",
    );
    let child = dir.path().join("child.json");
    write(
        &child,
        r#"{"_extends": "base.yaml", "version": "1.0.0", "framework": "ascend"}"#,
    );

    let loader = ConfigLoader::default();
    let doc = loader.load(&child, false, false).expect("load failed");
    assert_eq!(
        doc.get("training"),
        Some(&json!({"total_timesteps": 100000}))
    );
}

#[test]
fn plugin_section_returns_named_subtree() {
    let loader = ConfigLoader::default();
    let doc = loader
        .load_from_str(
            r#"{"version": "1.0.0", "framework": "ascend", "metrics": {"interval": 5}}"#,
            ConfigFormat::Json,
            false,
        )
        .expect("load failed");

    let section = ConfigLoader::plugin_section(&doc, "metrics").expect("section missing");
    assert_eq!(section.get("interval"), Some(&json!(5)));
    assert!(ConfigLoader::plugin_section(&doc, "absent").is_none());
}
