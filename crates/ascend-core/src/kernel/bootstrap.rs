use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::Value;

use crate::config::loader::ConfigLoader;
use crate::config::parser::ConfigDocument;
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::plugin_system::discovery::PluginDiscovery;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manager::{PluginManager, PluginState};
use crate::plugin_system::traits::PluginCtor;

/// Explicit owner of the framework's long-lived state.
///
/// Wires the config loader and plugin manager together without any global
/// registry; construction, plugin loading and shutdown all happen at points
/// the caller chooses.
pub struct Application {
    config: ConfigDocument,
    config_path: Option<PathBuf>,
    loader: ConfigLoader,
    manager: PluginManager,
}

impl Application {
    /// Build an application around the default configuration document and
    /// the fixed default plugin search paths.
    pub fn new() -> Self {
        let loader = ConfigLoader::default();
        let config = loader.create_default();
        let manager = PluginManager::new(PluginDiscovery::new(constants::default_plugin_paths()));
        Self {
            config,
            config_path: None,
            loader,
            manager,
        }
    }

    /// Build an application from a configuration file, which is loaded and
    /// validated up front. Plugin search paths come from the document's
    /// `plugin_paths` list when present, else the fixed default set.
    pub fn with_config(path: &Path) -> Result<Self> {
        let loader = ConfigLoader::default();
        let config = loader.load(path, true, true)?;
        let search_paths = configured_plugin_paths(&config)
            .unwrap_or_else(constants::default_plugin_paths);
        let manager = PluginManager::new(PluginDiscovery::new(search_paths));
        info!("application configured from {}", path.display());
        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
            loader,
            manager,
        })
    }

    pub fn config(&self) -> &ConfigDocument {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn loader(&self) -> &ConfigLoader {
        &self.loader
    }

    pub fn manager(&self) -> &PluginManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut PluginManager {
        &mut self.manager
    }

    /// Register a plugin constructor under a name.
    pub fn register_plugin(&mut self, name: &str, ctor: PluginCtor) -> Result<()> {
        self.manager.discovery_mut().register_static(name, ctor)?;
        Ok(())
    }

    /// Load and initialize every plugin the configuration document names.
    ///
    /// The `plugins` list holds specifier strings; each successfully loaded
    /// plugin is then initialized with its config section (a top-level
    /// mapping under the plugin's name, when present). Individual failures
    /// do not stop the batch; they are reported together at the end.
    pub fn load_configured_plugins(&mut self) -> Result<()> {
        let discovered = self.manager.discover_plugins(false);

        let mut specs = configured_plugin_specs(&self.config);
        if auto_discover_enabled(&self.config) {
            for name in discovered {
                if !specs
                    .iter()
                    .any(|spec| crate::plugin_system::version::parse_plugin_spec(spec).0 == name)
                {
                    specs.push(name);
                }
            }
        }
        if specs.is_empty() {
            info!("no plugins configured");
            return Ok(());
        }

        let mut failed = match self.manager.load_plugins(&specs) {
            Ok(()) => Vec::new(),
            Err(PluginSystemError::BatchLoadFailed { failed }) => failed,
            Err(e) => return Err(e.into()),
        };

        for name in self.manager.loaded_plugins() {
            let loaded = self
                .manager
                .plugin_status(&name)
                .is_some_and(|s| s.state == PluginState::Loaded);
            if !loaded {
                continue;
            }
            let section = ConfigLoader::plugin_section(&self.config, &name);
            if let Err(e) = self.manager.initialize_plugin(&name, section.as_ref()) {
                warn!("failed to initialize plugin '{name}': {e}");
                failed.push(name);
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(PluginSystemError::BatchLoadFailed { failed }.into())
        }
    }

    /// Start every initialized plugin, dependencies before dependents.
    pub fn start_all(&mut self) -> Result<()> {
        for name in self.manager.dependency_order()? {
            let initialized = self
                .manager
                .plugin_status(&name)
                .is_some_and(|s| s.state == PluginState::Initialized);
            if initialized {
                self.manager.start_plugin(&name)?;
            }
        }
        Ok(())
    }

    /// Stop every running plugin, dependents before dependencies.
    /// Individual stop failures are logged and do not block the rest.
    pub fn stop_all(&mut self) {
        let order = match self.manager.dependency_order() {
            Ok(order) => order,
            Err(e) => {
                warn!("cannot compute stop order, stopping in name order: {e}");
                self.manager.loaded_plugins()
            }
        };
        for name in order.iter().rev() {
            let running = self
                .manager
                .plugin_status(name)
                .is_some_and(|s| s.state == PluginState::Running);
            if running {
                if let Err(e) = self.manager.stop_plugin(name) {
                    warn!("failed to stop plugin '{name}': {e}");
                }
            }
        }
    }

    /// Defined exit point: stop everything, drop all plugins and flush the
    /// config cache.
    pub fn shutdown(&mut self) {
        info!("shutting down");
        self.stop_all();
        self.manager.clear_all();
        self.loader.clear_cache();
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

/// Plugin specifier strings from the document's `plugins` list. Non-string
/// entries are skipped here; the validator reports them separately.
fn configured_plugin_specs(config: &ConfigDocument) -> Vec<String> {
    config
        .get("plugins")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn auto_discover_enabled(config: &ConfigDocument) -> bool {
    config
        .get("auto_discover")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn configured_plugin_paths(config: &ConfigDocument) -> Option<Vec<PathBuf>> {
    let entries = config.get("plugin_paths")?.as_array()?;
    Some(
        entries
            .iter()
            .filter_map(Value::as_str)
            .map(PathBuf::from)
            .collect(),
    )
}
