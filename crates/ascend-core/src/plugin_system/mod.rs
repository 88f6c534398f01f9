//! # Ascend Core Plugin System
//!
//! Discovery, dependency resolution and lifecycle management for plugins:
//!
//! - [`traits`]: the [`Plugin`] capability contract, component registry and
//!   host context.
//! - [`descriptor`]: immutable plugin records and on-disk manifests.
//! - [`discovery`]: constructor registration and manifest scanning, plus
//!   dependency-order resolution.
//! - [`manager`]: instance ownership and the lifecycle state machine.
//! - [`version`]: plugin specifier parsing and constraint evaluation.
//!
//! Plugin implementations are registered as constructors and described by
//! manifests; no dynamic code loading is involved.

pub mod dependency;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod manager;
pub mod traits;
pub mod version;

pub use dependency::{DependencyError, PluginDependency};
pub use descriptor::{PluginDescriptor, PluginManifest, PluginOrigin};
pub use discovery::PluginDiscovery;
pub use error::PluginSystemError;
pub use manager::{PluginManager, PluginState, PluginStatus};
pub use traits::{ComponentRegistry, ConfigSchema, HostContext, Plugin, PluginCtor, PluginMetadata};
pub use version::{VersionError, parse_plugin_spec, satisfies};

#[cfg(test)]
mod tests;
