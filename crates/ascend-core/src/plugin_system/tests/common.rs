//! Mock plugins shared by the plugin system tests.
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::ConfigDocument;
use crate::config::validator::{FieldRule, RuleType};
use crate::plugin_system::dependency::PluginDependency;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::{
    ComponentRegistry, ConfigSchema, HostContext, Plugin, PluginMetadata,
};

/// Stop invocations across all counting plugins, for unload assertions.
pub static STOP_COUNT: AtomicUsize = AtomicUsize::new(0);

pub struct MockPlugin {
    name: &'static str,
    version: &'static str,
    deps: Vec<PluginDependency>,
    fail_on: Option<&'static str>,
    with_schema: bool,
    count_stops: bool,
    pub applied_config: Option<ConfigDocument>,
}

impl MockPlugin {
    pub fn new(name: &'static str, version: &'static str) -> Self {
        Self {
            name,
            version,
            deps: Vec::new(),
            fail_on: None,
            with_schema: false,
            count_stops: false,
            applied_config: None,
        }
    }

    pub fn requires(mut self, spec: &str) -> Self {
        self.deps.push(PluginDependency::from_spec(spec));
        self
    }

    pub fn failing(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    pub fn with_schema(mut self) -> Self {
        self.with_schema = true;
        self
    }

    pub fn counting_stops(mut self) -> Self {
        self.count_stops = true;
        self
    }

    fn fail_if(&self, operation: &str) -> Result<(), PluginSystemError> {
        if self.fail_on == Some(operation) {
            return Err(PluginSystemError::Lifecycle {
                plugin: self.name.to_string(),
                operation: operation.to_string(),
                message: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Plugin for MockPlugin {
    fn name(&self) -> &str {
        self.name
    }

    fn version(&self) -> &str {
        self.version
    }

    fn description(&self) -> &str {
        "mock plugin"
    }

    fn metadata(&self) -> PluginMetadata {
        let mut meta = PluginMetadata::new(self.name, self.version);
        meta.description = self.description().to_string();
        meta.requires = self.deps.clone();
        meta
    }

    fn config_schema(&self) -> Option<ConfigSchema> {
        if !self.with_schema {
            return None;
        }
        Some(ConfigSchema::new().rule(
            "interval",
            FieldRule {
                required: true,
                kind: Some(RuleType::Integer),
                min: Some(1.0),
                ..Default::default()
            },
        ))
    }

    fn register(&self, registry: &mut ComponentRegistry) -> Result<(), PluginSystemError> {
        self.fail_if("register")?;
        registry.register("mock", self.name, Box::new(self.version.to_string()));
        Ok(())
    }

    fn configure(&mut self, config: &ConfigDocument) -> Result<(), PluginSystemError> {
        self.fail_if("configure")?;
        self.applied_config = Some(config.clone());
        Ok(())
    }

    fn start(&mut self, _host: &HostContext) -> Result<(), PluginSystemError> {
        self.fail_if("start")
    }

    fn stop(&mut self) -> Result<(), PluginSystemError> {
        if self.count_stops {
            STOP_COUNT.fetch_add(1, Ordering::SeqCst);
        }
        self.fail_if("stop")
    }
}

pub fn plugin_a() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("a", "1.0.0"))
}

pub fn plugin_b() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("b", "1.5.0"))
}

pub fn plugin_c_requires_a() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("c", "2.0.0").requires("a"))
}

pub fn plugin_d_requires_c() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("d", "0.3.0").requires("c"))
}

pub fn plugin_with_schema() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("schema", "1.0.0").with_schema())
}

pub fn failing_register_plugin() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("bad_register", "1.0.0").failing("register"))
}

pub fn failing_configure_plugin() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("bad_configure", "1.0.0").failing("configure"))
}

pub fn failing_start_plugin() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("bad_start", "1.0.0").failing("start"))
}

pub fn counting_stop_plugin() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("counter", "1.0.0").counting_stops())
}

pub fn cyclic_x() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("cycle_x", "1.0.0").requires("cycle_y"))
}

pub fn cyclic_y() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("cycle_y", "1.0.0").requires("cycle_x"))
}
