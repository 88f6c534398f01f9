use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::plugin_system::dependency::PluginDependency;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::{Plugin, PluginCtor};

/// Where a discovered plugin came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginOrigin {
    /// Statically registered constructor.
    Builtin,
    /// Described by a manifest file on disk.
    Manifest(PathBuf),
}

/// Immutable record of a discovered plugin.
///
/// A descriptor is never mutated in place; re-discovery and metadata refresh
/// replace it wholesale.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    pub name: String,
    pub version: String,
    pub description: String,
    pub origin: PluginOrigin,
    /// Declared dependencies, in declaration order, deduped by name.
    pub dependencies: Vec<PluginDependency>,
    pub has_config_schema: bool,
    pub(crate) ctor: PluginCtor,
}

impl PluginDescriptor {
    /// Phase-1 descriptor for a statically registered constructor. Version
    /// and dependency metadata stay empty until first instantiation.
    pub(crate) fn placeholder(name: &str, ctor: PluginCtor) -> Self {
        Self {
            name: name.to_string(),
            version: String::new(),
            description: String::new(),
            origin: PluginOrigin::Builtin,
            dependencies: Vec::new(),
            has_config_schema: false,
            ctor,
        }
    }

    /// Phase-2 refresh from a live instance.
    ///
    /// Only placeholder descriptors take the instance's self-reported
    /// version and dependencies; a manifest is the authoritative source of
    /// declared metadata and keeps it across instantiation. The schema flag
    /// is only knowable from a live instance, so it refreshes either way.
    pub(crate) fn refreshed_from(&self, instance: &dyn Plugin) -> Self {
        match &self.origin {
            PluginOrigin::Builtin => {
                let meta = instance.metadata();
                Self {
                    name: self.name.clone(),
                    version: meta.version,
                    description: meta.description,
                    origin: self.origin.clone(),
                    dependencies: dedupe_dependencies(meta.requires),
                    has_config_schema: instance.config_schema().is_some(),
                    ctor: self.ctor,
                }
            }
            PluginOrigin::Manifest(_) => Self {
                has_config_schema: instance.config_schema().is_some(),
                ..self.clone()
            },
        }
    }

    pub(crate) fn instantiate(&self) -> Box<dyn Plugin> {
        (self.ctor)()
    }
}

/// On-disk plugin description. Points at a registered constructor via
/// `entry`; dependencies are plugin specifier strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    /// Name of the registered implementation backing this manifest.
    pub entry: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl PluginManifest {
    /// Parse a manifest from file content, dispatching on the extension.
    pub fn from_str(text: &str, path: &Path) -> Result<Self, PluginSystemError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("json") => {
                serde_json::from_str(text).map_err(|e| PluginSystemError::ManifestError {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
            #[cfg(feature = "yaml-config")]
            Some("yaml" | "yml") => {
                serde_yaml::from_str(text).map_err(|e| PluginSystemError::ManifestError {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
            _ => Err(PluginSystemError::ManifestError {
                path: path.to_path_buf(),
                message: "unsupported manifest extension".to_string(),
            }),
        }
    }

    /// Build a descriptor from this manifest and the constructor it names.
    pub(crate) fn into_descriptor(self, path: &Path, ctor: PluginCtor) -> PluginDescriptor {
        PluginDescriptor {
            name: self.name,
            version: self.version,
            description: self.description,
            origin: PluginOrigin::Manifest(path.to_path_buf()),
            dependencies: dedupe_dependencies(
                self.dependencies
                    .iter()
                    .map(|spec| PluginDependency::from_spec(spec))
                    .collect(),
            ),
            has_config_schema: false,
            ctor,
        }
    }
}

/// Preserve declaration order, keep the first occurrence of each name.
fn dedupe_dependencies(deps: Vec<PluginDependency>) -> Vec<PluginDependency> {
    let mut seen = std::collections::HashSet::new();
    deps.into_iter()
        .filter(|dep| seen.insert(dep.name.clone()))
        .collect()
}
