use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::{debug, info, warn};

use crate::config::ConfigDocument;
use crate::plugin_system::discovery::PluginDiscovery;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::{ComponentRegistry, HostContext, Plugin};
use crate::plugin_system::version::parse_plugin_spec;

/// Lifecycle state of a managed plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Discovered,
    Loaded,
    Initialized,
    Running,
    Stopped,
    Error,
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluginState::Discovered => "Discovered",
            PluginState::Loaded => "Loaded",
            PluginState::Initialized => "Initialized",
            PluginState::Running => "Running",
            PluginState::Stopped => "Stopped",
            PluginState::Error => "Error",
        };
        write!(f, "{name}")
    }
}

/// Tracked status of a plugin: its lifecycle state, the last error if any,
/// the config applied to it, and the satisfaction flag per dependency.
#[derive(Debug, Clone)]
pub struct PluginStatus {
    pub state: PluginState,
    pub error: Option<String>,
    pub config: Option<ConfigDocument>,
    pub dependencies: BTreeMap<String, bool>,
}

impl PluginStatus {
    fn new(state: PluginState) -> Self {
        Self {
            state,
            error: None,
            config: None,
            dependencies: BTreeMap::new(),
        }
    }

    pub fn dependencies_satisfied(&self) -> bool {
        self.dependencies.values().all(|satisfied| *satisfied)
    }
}

/// Owns plugin instances and drives them through the lifecycle state
/// machine.
///
/// Single-owner and synchronous. Every transition boundary records failure
/// in the plugin's status (message verbatim, state forced to `Error`) before
/// returning the error to the caller.
pub struct PluginManager {
    discovery: PluginDiscovery,
    components: ComponentRegistry,
    host: HostContext,
    plugins: HashMap<String, Box<dyn Plugin>>,
    status: HashMap<String, PluginStatus>,
}

impl PluginManager {
    pub fn new(discovery: PluginDiscovery) -> Self {
        Self {
            discovery,
            components: ComponentRegistry::new(),
            host: HostContext::default(),
            plugins: HashMap::new(),
            status: HashMap::new(),
        }
    }

    pub fn discovery(&self) -> &PluginDiscovery {
        &self.discovery
    }

    pub fn discovery_mut(&mut self) -> &mut PluginDiscovery {
        &mut self.discovery
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Run discovery and seed `Discovered` statuses for anything new.
    pub fn discover_plugins(&mut self, refresh: bool) -> Vec<String> {
        if refresh {
            self.discovery.clear_cache();
        }
        let names = self.discovery.discover();
        for name in &names {
            self.status
                .entry(name.clone())
                .or_insert_with(|| PluginStatus::new(PluginState::Discovered));
        }
        names
    }

    /// Load a plugin from a specifier (`name` or `name:constraint`).
    ///
    /// Loading is idempotent for an already-loaded name. Dependencies are
    /// loaded depth-first before the plugin itself; a version constraint
    /// that the live instance does not satisfy fails the whole load.
    pub fn load_plugin(&mut self, spec: &str) -> Result<(), PluginSystemError> {
        let (name, constraint) = parse_plugin_spec(spec);
        if self.plugins.contains_key(&name) {
            debug!("plugin '{name}' already loaded");
            return Ok(());
        }

        if self.discovery.get_info(&name).is_none() {
            self.discover_plugins(false);
        }
        if self.discovery.get_info(&name).is_none() {
            return Err(PluginSystemError::NotFound(name));
        }

        match self.load_plugin_inner(&name, constraint.as_deref()) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.record_failure(&name, &e);
                Err(e)
            }
        }
    }

    fn load_plugin_inner(
        &mut self,
        name: &str,
        constraint: Option<&str>,
    ) -> Result<(), PluginSystemError> {
        // phase-2 instantiation refreshes the descriptor before any
        // constraint or dependency decision is made from it
        let plugin = self.discovery.instantiate(name)?;

        if !crate::plugin_system::version::satisfies(plugin.version(), constraint) {
            return Err(PluginSystemError::VersionIncompatibility {
                plugin: name.to_string(),
                constraint: constraint.unwrap_or_default().to_string(),
                actual: plugin.version().to_string(),
            });
        }

        let dependencies = self
            .discovery
            .get_info(name)
            .map(|d| d.dependencies.clone())
            .unwrap_or_default();

        let mut dependency_flags = BTreeMap::new();
        for dep in &dependencies {
            self.load_plugin(&dep.to_string())?;
            let dep_version = self
                .plugins
                .get(&dep.name)
                .map(|p| p.version().to_string())
                .unwrap_or_default();
            if !dep.is_satisfied_by(&dep_version) {
                return Err(PluginSystemError::VersionIncompatibility {
                    plugin: dep.name.clone(),
                    constraint: dep.constraint.clone().unwrap_or_default(),
                    actual: dep_version,
                });
            }
            dependency_flags.insert(dep.name.clone(), true);
        }

        plugin
            .register(&mut self.components)
            .map_err(|e| PluginSystemError::Lifecycle {
                plugin: name.to_string(),
                operation: "register".to_string(),
                message: e.to_string(),
            })?;

        self.plugins.insert(name.to_string(), plugin);
        let status = self
            .status
            .entry(name.to_string())
            .or_insert_with(|| PluginStatus::new(PluginState::Discovered));
        status.state = PluginState::Loaded;
        status.error = None;
        status.dependencies = dependency_flags;
        info!("loaded plugin '{name}'");
        Ok(())
    }

    /// Initialize a loaded plugin, optionally applying its config section.
    ///
    /// Requires the `Loaded` state (or `Error`, for a retry after a failed
    /// initialization). The dependency-satisfaction invariant is enforced
    /// here: every tracked dependency flag must be true.
    pub fn initialize_plugin(
        &mut self,
        name: &str,
        config: Option<&ConfigDocument>,
    ) -> Result<(), PluginSystemError> {
        let state = self.require_state(
            name,
            "initialize",
            &[PluginState::Loaded, PluginState::Error],
            PluginState::Loaded,
        )?;
        debug!("initializing plugin '{name}' from state {state}");

        let satisfied = self
            .status
            .get(name)
            .map(PluginStatus::dependencies_satisfied)
            .unwrap_or(true);
        if !satisfied {
            let e = PluginSystemError::Lifecycle {
                plugin: name.to_string(),
                operation: "initialize".to_string(),
                message: "unsatisfied dependencies".to_string(),
            };
            self.record_failure(name, &e);
            return Err(e);
        }

        if let Some(config) = config {
            if let Err(e) = self.apply_config(name, config) {
                self.record_failure(name, &e);
                return Err(e);
            }
        }

        if let Some(status) = self.status.get_mut(name) {
            status.state = PluginState::Initialized;
            status.error = None;
            status.config = config.cloned();
        }
        info!("initialized plugin '{name}'");
        Ok(())
    }

    fn apply_config(&mut self, name: &str, config: &ConfigDocument) -> Result<(), PluginSystemError> {
        let plugin = self
            .plugins
            .get_mut(name)
            .ok_or_else(|| PluginSystemError::NotFound(name.to_string()))?;

        if let Some(schema) = plugin.config_schema() {
            let violations = schema.check(config);
            if !violations.is_empty() {
                return Err(PluginSystemError::Lifecycle {
                    plugin: name.to_string(),
                    operation: "configure".to_string(),
                    message: violations.join("; "),
                });
            }
        }

        plugin
            .configure(config)
            .map_err(|e| PluginSystemError::Lifecycle {
                plugin: name.to_string(),
                operation: "configure".to_string(),
                message: e.to_string(),
            })
    }

    /// Start an initialized plugin.
    pub fn start_plugin(&mut self, name: &str) -> Result<(), PluginSystemError> {
        self.require_state(name, "start", &[PluginState::Initialized], PluginState::Initialized)?;

        let plugin = self
            .plugins
            .get_mut(name)
            .ok_or_else(|| PluginSystemError::NotFound(name.to_string()))?;
        if let Err(e) = plugin.start(&self.host) {
            let e = PluginSystemError::Lifecycle {
                plugin: name.to_string(),
                operation: "start".to_string(),
                message: e.to_string(),
            };
            self.record_failure(name, &e);
            return Err(e);
        }

        if let Some(status) = self.status.get_mut(name) {
            status.state = PluginState::Running;
            status.error = None;
        }
        info!("started plugin '{name}'");
        Ok(())
    }

    /// Stop a running plugin.
    pub fn stop_plugin(&mut self, name: &str) -> Result<(), PluginSystemError> {
        self.require_state(name, "stop", &[PluginState::Running], PluginState::Running)?;

        let plugin = self
            .plugins
            .get_mut(name)
            .ok_or_else(|| PluginSystemError::NotFound(name.to_string()))?;
        if let Err(e) = plugin.stop() {
            let e = PluginSystemError::Lifecycle {
                plugin: name.to_string(),
                operation: "stop".to_string(),
                message: e.to_string(),
            };
            self.record_failure(name, &e);
            return Err(e);
        }

        if let Some(status) = self.status.get_mut(name) {
            status.state = PluginState::Stopped;
            status.error = None;
        }
        info!("stopped plugin '{name}'");
        Ok(())
    }

    /// Remove a plugin entirely.
    ///
    /// A running plugin is stopped first on a best-effort basis; a stop
    /// failure is logged but never blocks removal. Instance and status are
    /// both dropped unconditionally.
    pub fn unload_plugin(&mut self, name: &str) -> Result<(), PluginSystemError> {
        if !self.plugins.contains_key(name) && !self.status.contains_key(name) {
            return Err(PluginSystemError::NotFound(name.to_string()));
        }

        let running = self
            .status
            .get(name)
            .is_some_and(|s| s.state == PluginState::Running);
        if running {
            if let Some(plugin) = self.plugins.get_mut(name) {
                if let Err(e) = plugin.stop() {
                    warn!("plugin '{name}' failed to stop during unload: {e}");
                }
            }
        }

        self.plugins.remove(name);
        self.status.remove(name);
        info!("unloaded plugin '{name}'");
        Ok(())
    }

    /// Load a batch of specifiers, continuing past individual failures.
    ///
    /// Successfully loaded plugins stay loaded; the failed specifiers are
    /// reported together in a single error.
    pub fn load_plugins(&mut self, specs: &[String]) -> Result<(), PluginSystemError> {
        let mut failed = Vec::new();
        for spec in specs {
            if let Err(e) = self.load_plugin(spec) {
                warn!("failed to load plugin '{spec}': {e}");
                failed.push(spec.clone());
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(PluginSystemError::BatchLoadFailed { failed })
        }
    }

    /// Unload everything, skipping individual failures, and drop all
    /// registered components.
    pub fn clear_all(&mut self) {
        let mut names: Vec<String> = self.plugins.keys().cloned().collect();
        names.sort();
        for name in names {
            if let Err(e) = self.unload_plugin(&name) {
                warn!("failed to unload plugin '{name}': {e}");
            }
        }
        self.status.clear();
        self.components.clear();
    }

    /// Loaded plugin names in an order where dependencies precede their
    /// dependents.
    pub fn dependency_order(&self) -> Result<Vec<String>, PluginSystemError> {
        let mut loaded: Vec<String> = self.plugins.keys().cloned().collect();
        loaded.sort();
        Ok(self.discovery.resolve_dependencies(&loaded)?)
    }

    pub fn get_plugin(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name).map(|p| p.as_ref())
    }

    pub fn plugin_status(&self, name: &str) -> Option<&PluginStatus> {
        self.status.get(name)
    }

    pub fn loaded_plugins(&self) -> Vec<String> {
        let mut names: Vec<String> = self.plugins.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn available_plugins(&self) -> Vec<String> {
        self.discovery.names()
    }

    /// Check the current state against the allowed entry states for an
    /// operation, returning the current state on success.
    fn require_state(
        &self,
        name: &str,
        operation: &str,
        allowed: &[PluginState],
        required: PluginState,
    ) -> Result<PluginState, PluginSystemError> {
        let Some(status) = self.status.get(name) else {
            return Err(PluginSystemError::NotFound(name.to_string()));
        };
        if !self.plugins.contains_key(name) {
            return Err(PluginSystemError::NotFound(name.to_string()));
        }
        if !allowed.contains(&status.state) {
            return Err(PluginSystemError::InvalidState {
                plugin: name.to_string(),
                operation: operation.to_string(),
                required: required.to_string(),
                actual: status.state.to_string(),
            });
        }
        Ok(status.state)
    }

    fn record_failure(&mut self, name: &str, error: &PluginSystemError) {
        let status = self
            .status
            .entry(name.to_string())
            .or_insert_with(|| PluginStatus::new(PluginState::Error));
        status.state = PluginState::Error;
        status.error = Some(error.to_string());
    }
}
