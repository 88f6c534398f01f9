use std::any::Any;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigDocument;
use crate::config::validator::FieldRule;
use crate::kernel::constants;
use crate::plugin_system::dependency::PluginDependency;
use crate::plugin_system::error::PluginSystemError;

/// Self-reported plugin metadata, refreshed from the live instance on first
/// instantiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Plugins this plugin requires, with optional version constraints.
    #[serde(default)]
    pub requires: Vec<PluginDependency>,
    /// Capability names this plugin offers to others.
    #[serde(default)]
    pub provides: Vec<String>,
    /// Framework version constraint this plugin claims to work with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible_with: Option<String>,
}

impl PluginMetadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            author: None,
            license: None,
            requires: Vec::new(),
            provides: Vec::new(),
            compatible_with: None,
        }
    }
}

/// Declarative validation rules a plugin may expose for its own config
/// section. Applied before the section is handed to `configure`.
#[derive(Debug, Default)]
pub struct ConfigSchema {
    rules: Vec<(String, FieldRule)>,
}

impl ConfigSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, path: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.push((path.into(), rule));
        self
    }

    /// Check a config section against the schema, returning every violation.
    pub fn check(&self, config: &ConfigDocument) -> Vec<String> {
        let mut violations = Vec::new();
        for (path, rule) in &self.rules {
            let value = lookup(config, path);
            let Some(value) = value else {
                if rule.required {
                    violations.push(format!("Missing required field: {path}"));
                }
                continue;
            };
            if let Some(kind) = rule.kind {
                if !kind.matches(value) {
                    violations.push(format!("Field {path}: wrong type, expected {}", kind.name()));
                }
            }
            if let Some(n) = value.as_f64() {
                if rule.min.is_some_and(|min| n < min) || rule.max.is_some_and(|max| n > max) {
                    violations.push(format!("Field {path}: value {n} out of range"));
                }
            }
        }
        violations
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn lookup<'a>(doc: &'a ConfigDocument, path: &str) -> Option<&'a serde_json::Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Type-erased component store: category name to component name to instance.
/// The narrow seam through which plugins contribute functionality.
#[derive(Default)]
pub struct ComponentRegistry {
    components: HashMap<String, HashMap<String, Box<dyn Any + Send + Sync>>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        category: impl Into<String>,
        name: impl Into<String>,
        component: Box<dyn Any + Send + Sync>,
    ) {
        self.components
            .entry(category.into())
            .or_default()
            .insert(name.into(), component);
    }

    pub fn get(&self, category: &str, name: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.components
            .get(category)?
            .get(name)
            .map(|c| c.as_ref())
    }

    pub fn contains(&self, category: &str, name: &str) -> bool {
        self.components
            .get(category)
            .is_some_and(|entries| entries.contains_key(name))
    }

    pub fn categories(&self) -> Vec<&str> {
        self.components.keys().map(String::as_str).collect()
    }

    pub fn names_in(&self, category: &str) -> Vec<&str> {
        self.components
            .get(category)
            .map(|entries| entries.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.components.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.components.clear();
    }
}

/// Host information handed to plugins when they start.
#[derive(Debug, Clone)]
pub struct HostContext {
    pub framework: String,
    pub version: String,
}

impl Default for HostContext {
    fn default() -> Self {
        Self {
            framework: constants::FRAMEWORK_NAME.to_string(),
            version: constants::FRAMEWORK_VERSION.to_string(),
        }
    }
}

/// The capability contract every plugin implements.
///
/// All lifecycle operations are synchronous; fallible ones return
/// `Result` so the manager can record the failure and park the plugin in
/// its error state.
pub trait Plugin: Send + Sync {
    /// Unique plugin name.
    fn name(&self) -> &str;

    /// Concrete version of this plugin, ideally full semver.
    fn version(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Full self-description. Override to declare dependencies, capabilities
    /// or a framework compatibility constraint.
    fn metadata(&self) -> PluginMetadata {
        let mut meta = PluginMetadata::new(self.name(), self.version());
        meta.description = self.description().to_string();
        meta
    }

    /// Validation rules for this plugin's config section, if any.
    fn config_schema(&self) -> Option<ConfigSchema> {
        None
    }

    /// Contribute components to the shared registry. Called once at load.
    fn register(&self, _registry: &mut ComponentRegistry) -> Result<(), PluginSystemError> {
        Ok(())
    }

    /// Apply this plugin's config section. Called during initialization when
    /// a section exists for the plugin.
    fn configure(&mut self, _config: &ConfigDocument) -> Result<(), PluginSystemError> {
        Ok(())
    }

    fn start(&mut self, _host: &HostContext) -> Result<(), PluginSystemError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PluginSystemError> {
        Ok(())
    }
}

/// Constructor handle under which plugin implementations are registered.
pub type PluginCtor = fn() -> Box<dyn Plugin>;
