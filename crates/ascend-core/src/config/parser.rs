use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::config::error::ConfigSystemError;
use crate::storage::StorageProvider;

/// In-memory representation of a configuration document.
///
/// Key order is preserved from the source document.
pub type ConfigDocument = serde_json::Map<String, Value>;

/// Namespacing key under which `version`/`framework` may be nested.
pub const FRAMEWORK_KEY: &str = "ascend";

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
}

impl ConfigFormat {
    /// Get the canonical file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                _ => None,
            })
    }

    /// Comma-separated list of supported extensions, for error messages
    pub fn supported_extensions() -> String {
        #[cfg(feature = "yaml-config")]
        {
            ".json, .yaml, .yml".to_string()
        }
        #[cfg(not(feature = "yaml-config"))]
        {
            ".json".to_string()
        }
    }
}

/// Parses configuration documents, substitutes environment-variable
/// placeholders, and enforces the minimal document shape.
pub struct ConfigParser {
    provider: Arc<dyn StorageProvider>,
    env_var_pattern: Regex,
}

impl ConfigParser {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self {
            provider,
            // Placeholder syntax: ${NAME}
            env_var_pattern: Regex::new(r"\$\{([^}]+)\}").expect("invalid placeholder pattern"),
        }
    }

    /// Load and parse a configuration file.
    ///
    /// The format is determined from the file extension; an unsupported
    /// extension fails with an error naming the supported set.
    pub fn load(&self, path: &Path) -> Result<ConfigDocument, ConfigSystemError> {
        let format =
            ConfigFormat::from_path(path).ok_or_else(|| ConfigSystemError::UnsupportedFormat {
                path: path.to_path_buf(),
                supported: ConfigFormat::supported_extensions(),
            })?;

        let content = self.provider.read_to_string(path)?;
        self.parse(&content, format, Some(path))
    }

    /// Parse a configuration document from a string.
    pub fn load_from_str(
        &self,
        text: &str,
        format: ConfigFormat,
    ) -> Result<ConfigDocument, ConfigSystemError> {
        self.parse(text, format, None)
    }

    fn parse(
        &self,
        text: &str,
        format: ConfigFormat,
        path: Option<&Path>,
    ) -> Result<ConfigDocument, ConfigSystemError> {
        let value: Value = match format {
            ConfigFormat::Json => {
                serde_json::from_str(text).map_err(|e| ConfigSystemError::ParseError {
                    format: "JSON".to_string(),
                    path: path.map(Path::to_path_buf),
                    message: e.to_string(),
                })?
            }
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|e| ConfigSystemError::ParseError {
                    format: "YAML".to_string(),
                    path: path.map(Path::to_path_buf),
                    message: e.to_string(),
                })?
            }
        };

        let value = self.resolve_env_vars(value);
        let doc = match value {
            Value::Object(map) => map,
            other => {
                return Err(ConfigSystemError::Structural {
                    message: format!("config must be a mapping, got {}", value_type_name(&other)),
                    field: None,
                });
            }
        };
        validate_basic_structure(&doc)?;
        Ok(doc)
    }

    /// Recursively resolve `${NAME}` placeholders in every string leaf.
    fn resolve_env_vars(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, self.resolve_env_vars(v)))
                    .collect(),
            ),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.resolve_env_vars(v)).collect())
            }
            Value::String(s) => self.resolve_env_var_string(s),
            other => other,
        }
    }

    /// Substitute placeholders in a single string and opportunistically
    /// re-type the result. A placeholder whose variable is absent from the
    /// environment is left as literal text (optional-variable policy).
    fn resolve_env_var_string(&self, value: String) -> Value {
        if !self.env_var_pattern.is_match(&value) {
            return Value::String(value);
        }

        let mut substituted = false;
        let resolved = self
            .env_var_pattern
            .replace_all(&value, |caps: &regex::Captures<'_>| {
                match std::env::var(&caps[1]) {
                    Ok(env_value) => {
                        substituted = true;
                        Cow::Owned(env_value)
                    }
                    Err(_) => Cow::Owned(caps[0].to_string()),
                }
            })
            .into_owned();

        if !substituted {
            return Value::String(value);
        }
        retype_string(resolved)
    }

    /// Deep-merge two documents. Where both sides hold a mapping for the same
    /// key the merge recurses; otherwise the override value wins wholesale
    /// (scalars and sequences are replaced, never concatenated).
    pub fn merge(&self, base: &ConfigDocument, overlay: &ConfigDocument) -> ConfigDocument {
        merge_documents(base, overlay)
    }

    /// Serialize and save a configuration document.
    pub fn save(&self, doc: &ConfigDocument, path: &Path) -> Result<(), ConfigSystemError> {
        let format =
            ConfigFormat::from_path(path).ok_or_else(|| ConfigSystemError::UnsupportedFormat {
                path: path.to_path_buf(),
                supported: ConfigFormat::supported_extensions(),
            })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.provider.create_dir_all(parent)?;
            }
        }

        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(doc).map_err(|e| {
                ConfigSystemError::SaveFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                serde_yaml::to_string(doc).map_err(|e| ConfigSystemError::SaveFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?
            }
        };

        self.provider.write_string(path, &content)?;
        Ok(())
    }
}

fn merge_documents(base: &ConfigDocument, overlay: &ConfigDocument) -> ConfigDocument {
    let mut result = base.clone();
    for (key, value) in overlay {
        match (result.get(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                let merged = merge_documents(existing, incoming);
                result.insert(key.clone(), Value::Object(merged));
            }
            _ => {
                result.insert(key.clone(), value.clone());
            }
        }
    }
    result
}

/// Re-type a substituted string: integers, floats, booleans and null are
/// promoted to their native value types; anything else stays a string.
fn retype_string(s: String) -> Value {
    if let Ok(i) = s.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = s.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    match s.to_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    Value::String(s)
}

/// Look up a top-level field, falling back to one level of nesting under the
/// framework namespacing key.
pub fn namespaced_field<'a>(doc: &'a ConfigDocument, field: &str) -> Option<&'a Value> {
    doc.get(field).or_else(|| {
        doc.get(FRAMEWORK_KEY)
            .and_then(Value::as_object)
            .and_then(|ns| ns.get(field))
    })
}

/// Enforce the minimal document shape: `version` and `framework` present
/// (directly or nested under the namespace key), `version` a non-empty string.
pub fn validate_basic_structure(doc: &ConfigDocument) -> Result<(), ConfigSystemError> {
    if namespaced_field(doc, "version").is_none() {
        return Err(ConfigSystemError::Structural {
            message: "missing required field".to_string(),
            field: Some("version".to_string()),
        });
    }
    if namespaced_field(doc, "framework").is_none() {
        return Err(ConfigSystemError::Structural {
            message: "missing required field".to_string(),
            field: Some("framework".to_string()),
        });
    }

    match namespaced_field(doc, "version") {
        Some(Value::String(s)) if !s.is_empty() => Ok(()),
        _ => Err(ConfigSystemError::Structural {
            message: "version must be a non-empty string".to_string(),
            field: Some("version".to_string()),
        }),
    }
}

pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
