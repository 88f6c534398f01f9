//! # Ascend Core Configuration Errors
//!
//! Defines error types specific to the configuration subsystem: document
//! parsing and serialization failures, structural violations, aggregated
//! rule-table validation failures, and inheritance resolution problems.
use std::path::PathBuf;
use thiserror::Error;

use crate::storage::error::StorageSystemError;

#[derive(Debug, Error)]
pub enum ConfigSystemError {
    #[error("Unsupported config format for '{}': supported formats: {supported}", path.display())]
    UnsupportedFormat { path: PathBuf, supported: String },

    #[error("Failed to parse {format} config{}: {message}", path.as_ref().map(|p| format!(" at '{}'", p.display())).unwrap_or_default())]
    ParseError {
        format: String,
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Config structure error{}: {message}", field.as_ref().map(|f| format!(" (field '{f}')")).unwrap_or_default())]
    Structural {
        message: String,
        field: Option<String>,
    },

    #[error(
        "Config validation failed{} ({} errors, {} warnings):{}{}",
        path.as_ref().map(|p| format!(" for '{}'", p.display())).unwrap_or_default(),
        errors.len(),
        warnings.len(),
        if errors.is_empty() { String::new() } else { format!("\nErrors:\n- {}", errors.join("\n- ")) },
        if warnings.is_empty() { String::new() } else { format!("\nWarnings:\n- {}", warnings.join("\n- ")) },
    )]
    ValidationFailed {
        path: Option<PathBuf>,
        errors: Vec<String>,
        warnings: Vec<String>,
    },

    #[error("Circular config inheritance detected: {}", chain.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" -> "))]
    CircularInheritance { chain: Vec<PathBuf> },

    #[error("Failed to save config to '{}': {message}", path.display())]
    SaveFailed { path: PathBuf, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageSystemError),
}
