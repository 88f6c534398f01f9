//! # Ascend Core
//!
//! Core library of the Ascend plugin framework: a configuration-driven
//! kernel that discovers plugins, resolves their dependencies and drives
//! them through an explicit lifecycle.
//!
//! ## Subsystems
//!
//! - [`kernel`]: framework constants, the aggregated error type, and the
//!   [`kernel::bootstrap::Application`] owner wiring everything together.
//! - [`config`]: layered configuration with inheritance,
//!   environment-variable substitution, declarative validation and caching.
//! - [`plugin_system`]: plugin discovery, version-constrained dependency
//!   resolution and lifecycle management.
//! - [`storage`]: the narrow filesystem seam behind the config subsystem.
//!
//! The core is synchronous and single-owner; nothing here spawns threads or
//! holds global state.

pub mod config;
pub mod kernel;
pub mod plugin_system;
pub mod storage;

pub use config::{ConfigDocument, ConfigFormat, ConfigLoader, ConfigSystemError};
pub use kernel::{Application, Error, Result};
pub use plugin_system::{
    Plugin, PluginCtor, PluginManager, PluginState, PluginSystemError, PluginMetadata,
};
pub use storage::{LocalStorageProvider, StorageProvider, StorageSystemError};
