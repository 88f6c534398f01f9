//! # Ascend Core Plugin System Errors
//!
//! Defines error types specific to the plugin system: lookup failures,
//! version incompatibilities, lifecycle state violations, manifest problems,
//! and aggregated batch-load failures. Expected outcomes are typed variants
//! so callers can match on them without inspecting message strings.
use std::path::PathBuf;

use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin not found: '{0}'")]
    NotFound(String),

    #[error("Plugin loading failed for '{plugin}': {message}")]
    LoadingError { plugin: String, message: String },

    #[error("Plugin '{plugin}' version {actual} does not satisfy constraint '{constraint}'")]
    VersionIncompatibility {
        plugin: String,
        constraint: String,
        actual: String,
    },

    #[error("Cannot {operation} plugin '{plugin}': requires state {required}, current state is {actual}")]
    InvalidState {
        plugin: String,
        operation: String,
        required: String,
        actual: String,
    },

    #[error("Plugin '{plugin}' failed during {operation}: {message}")]
    Lifecycle {
        plugin: String,
        operation: String,
        message: String,
    },

    #[error("Plugin registration error for '{plugin}': {message}")]
    RegistrationError { plugin: String, message: String },

    #[error("Plugin manifest error for '{}': {message}", path.display())]
    ManifestError { path: PathBuf, message: String },

    #[error("Failed to load {} plugin(s): {}", failed.len(), failed.join(", "))]
    BatchLoadFailed { failed: Vec<String> },

    #[error("Dependency resolution failed: {0}")]
    DependencyResolution(#[from] DependencyError),

    #[error("Version error: {0}")]
    Version(#[from] VersionError),
}
