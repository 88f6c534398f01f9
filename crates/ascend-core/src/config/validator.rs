use std::path::Path;

use regex::Regex;
use serde_json::Value;

use crate::config::error::ConfigSystemError;
use crate::config::parser::{ConfigDocument, value_type_name};

/// Primitive type a field rule may assert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleType {
    String,
    Integer,
    Number,
    Boolean,
    Mapping,
    Sequence,
}

impl RuleType {
    pub fn name(&self) -> &'static str {
        match self {
            RuleType::String => "string",
            RuleType::Integer => "integer",
            RuleType::Number => "number",
            RuleType::Boolean => "boolean",
            RuleType::Mapping => "mapping",
            RuleType::Sequence => "sequence",
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            RuleType::String => value.is_string(),
            RuleType::Integer => value.is_i64() || value.is_u64(),
            RuleType::Number => value.is_number(),
            RuleType::Boolean => value.is_boolean(),
            RuleType::Mapping => value.is_object(),
            RuleType::Sequence => value.is_array(),
        }
    }
}

/// Declarative rule for a single dot-path addressed field.
#[derive(Debug, Default)]
pub struct FieldRule {
    pub required: bool,
    pub kind: Option<RuleType>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub allowed: Option<Vec<String>>,
}

/// Sections every complete document must carry.
const REQUIRED_SECTIONS: [&str; 3] = ["agent", "environment", "training"];

/// Sections holding component subtrees whose entries should declare a type.
const COMPONENT_SECTIONS: [&str; 4] = ["agent", "environment", "models", "rewards"];

/// Declared filesystem-path fields checked for an existing parent directory.
const PATH_FIELDS: [&str; 2] = ["training.log_dir", "training.checkpoint_dir"];

/// Applies the declarative field-rule table against a parsed document,
/// accumulating all violations instead of stopping at the first one.
pub struct ConfigValidator {
    rules: Vec<(String, FieldRule)>,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self {
            rules: base_rules(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Validate a document against the rule table.
    ///
    /// With `strict` set, a structural violation is raised immediately;
    /// otherwise all problems are accumulated and `Ok(false)` is returned,
    /// leaving the caller to inspect [`errors`](Self::errors) and
    /// [`warnings`](Self::warnings).
    pub fn validate(
        &mut self,
        doc: &ConfigDocument,
        strict: bool,
    ) -> Result<bool, ConfigSystemError> {
        self.errors.clear();
        self.warnings.clear();

        if let Err(structural) = check_required_sections(doc) {
            if strict {
                return Err(structural);
            }
            self.errors.push(structural.to_string());
            return Ok(false);
        }

        self.validate_fields(doc);
        self.validate_components(doc);
        self.validate_plugin_list(doc);
        self.validate_paths(doc);

        Ok(self.errors.is_empty())
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn clear(&mut self) {
        self.errors.clear();
        self.warnings.clear();
    }

    /// Every rule is evaluated independently; evaluation never stops at the
    /// first failure.
    fn validate_fields(&mut self, doc: &ConfigDocument) {
        for (path, rule) in &self.rules {
            let value = nested_value(doc, path);

            let Some(value) = value else {
                if rule.required {
                    self.errors.push(format!("Missing required field: {path}"));
                }
                continue;
            };

            if let Some(kind) = rule.kind {
                if !kind.matches(value) {
                    self.errors.push(format!(
                        "Field {path}: expected {}, got {}",
                        kind.name(),
                        value_type_name(value)
                    ));
                }
            }

            if let Some(n) = value.as_f64() {
                if let Some(min) = rule.min {
                    if n < min {
                        self.errors
                            .push(format!("Field {path}: value {n} is less than minimum {min}"));
                    }
                }
                if let Some(max) = rule.max {
                    if n > max {
                        self.errors.push(format!(
                            "Field {path}: value {n} is greater than maximum {max}"
                        ));
                    }
                }
            }

            if let Some(s) = value.as_str() {
                if let Some(min_length) = rule.min_length {
                    if s.chars().count() < min_length {
                        self.errors.push(format!(
                            "Field {path}: length {} is less than minimum {min_length}",
                            s.chars().count()
                        ));
                    }
                }
                if let Some(max_length) = rule.max_length {
                    if s.chars().count() > max_length {
                        self.errors.push(format!(
                            "Field {path}: length {} is greater than maximum {max_length}",
                            s.chars().count()
                        ));
                    }
                }
                if let Some(pattern) = &rule.pattern {
                    if !pattern.is_match(s) {
                        self.errors.push(format!(
                            "Field {path}: value '{s}' does not match pattern '{}'",
                            pattern.as_str()
                        ));
                    }
                }
                if let Some(allowed) = &rule.allowed {
                    if !allowed.iter().any(|a| a == s) {
                        self.errors.push(format!(
                            "Field {path}: value '{s}' is not one of: {}",
                            allowed.join(", ")
                        ));
                    }
                }
            }
        }
    }

    /// Component subtrees without a declared `type` are soft issues.
    fn validate_components(&mut self, doc: &ConfigDocument) {
        for section in COMPONENT_SECTIONS {
            let Some(entries) = doc.get(section).and_then(Value::as_object) else {
                continue;
            };
            for (name, entry) in entries {
                if let Value::Object(entry) = entry {
                    if !entry.contains_key("type") {
                        self.warnings
                            .push(format!("Component {section}.{name}: missing 'type' field"));
                    }
                }
            }
        }
    }

    /// Each entry in the plugin list must be a specifier string.
    fn validate_plugin_list(&mut self, doc: &ConfigDocument) {
        if let Some(Value::Array(plugins)) = doc.get("plugins") {
            if !plugins.iter().all(Value::is_string) {
                self.errors
                    .push("Plugins must be a list of strings".to_string());
            }
        }
    }

    /// Path fields whose parent directory does not exist produce a warning,
    /// not an error.
    fn validate_paths(&mut self, doc: &ConfigDocument) {
        for field in PATH_FIELDS {
            let Some(path_value) = nested_value(doc, field).and_then(Value::as_str) else {
                continue;
            };
            if path_value.is_empty() {
                continue;
            }
            if let Some(parent) = Path::new(path_value).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    self.warnings.push(format!(
                        "Path {field}: parent directory does not exist: {}",
                        parent.display()
                    ));
                }
            }
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_required_sections(doc: &ConfigDocument) -> Result<(), ConfigSystemError> {
    for section in REQUIRED_SECTIONS {
        if !doc.contains_key(section) {
            return Err(ConfigSystemError::Structural {
                message: "missing required section".to_string(),
                field: Some(section.to_string()),
            });
        }
    }
    Ok(())
}

/// Resolve a dot-path like `training.total_timesteps` against the document.
fn nested_value<'a>(doc: &'a ConfigDocument, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = doc.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// The base field-rule table.
fn base_rules() -> Vec<(String, FieldRule)> {
    let semver_pattern = Regex::new(r"^\d+\.\d+\.\d+$").expect("invalid semver pattern");
    vec![
        (
            "version".to_string(),
            FieldRule {
                required: true,
                kind: Some(RuleType::String),
                pattern: Some(semver_pattern),
                ..Default::default()
            },
        ),
        (
            "framework".to_string(),
            FieldRule {
                required: true,
                kind: Some(RuleType::String),
                allowed: Some(vec!["ascend".to_string()]),
                ..Default::default()
            },
        ),
        (
            "agent.type".to_string(),
            FieldRule {
                required: true,
                kind: Some(RuleType::String),
                min_length: Some(1),
                ..Default::default()
            },
        ),
        (
            "environment.type".to_string(),
            FieldRule {
                required: true,
                kind: Some(RuleType::String),
                min_length: Some(1),
                ..Default::default()
            },
        ),
        (
            "training.total_timesteps".to_string(),
            FieldRule {
                required: true,
                kind: Some(RuleType::Integer),
                min: Some(1000.0),
                ..Default::default()
            },
        ),
        (
            "training.learning_rate".to_string(),
            FieldRule {
                kind: Some(RuleType::Number),
                min: Some(0.0),
                max: Some(1.0),
                ..Default::default()
            },
        ),
    ]
}
