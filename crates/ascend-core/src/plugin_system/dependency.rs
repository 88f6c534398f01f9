use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plugin_system::version::{parse_plugin_spec, satisfies};

/// Error type for dependency resolution failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error("Missing plugin '{name}'{}", needed_by.as_ref().map(|d| format!(" (required by '{d}')")).unwrap_or_default())]
    MissingPlugin {
        name: String,
        needed_by: Option<String>,
    },

    #[error("Cyclic dependency detected among plugins: {}", .0.join(", "))]
    CyclicDependency(Vec<String>),
}

/// A declared dependency on another plugin, optionally version-constrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
}

impl PluginDependency {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
        }
    }

    pub fn with_constraint(name: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: Some(constraint.into()),
        }
    }

    /// Parse a `name` or `name:constraint` specifier.
    pub fn from_spec(spec: &str) -> Self {
        let (name, constraint) = parse_plugin_spec(spec);
        Self { name, constraint }
    }

    /// Check whether a concrete version satisfies this dependency.
    pub fn is_satisfied_by(&self, actual: &str) -> bool {
        satisfies(actual, self.constraint.as_deref())
    }
}

impl fmt::Display for PluginDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(constraint) => write!(f, "{}:{}", self.name, constraint),
            None => write!(f, "{}", self.name),
        }
    }
}
