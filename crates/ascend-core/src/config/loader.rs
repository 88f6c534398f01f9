use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use serde_json::{Value, json};

use crate::config::error::ConfigSystemError;
use crate::config::parser::{ConfigDocument, ConfigFormat, ConfigParser};
use crate::config::validator::ConfigValidator;
use crate::storage::{LocalStorageProvider, StorageProvider, StorageSystemError};

/// Key declaring the base document a configuration extends. Consumed during
/// loading and stripped from the result.
pub const EXTENDS_KEY: &str = "_extends";

/// Orchestrates parsing and validation, resolves configuration inheritance,
/// and caches resolved documents by absolute path.
///
/// Single-owner state: the cache is not synchronized and the loader must not
/// be shared across threads without an external guard.
pub struct ConfigLoader {
    parser: ConfigParser,
    validator: RefCell<ConfigValidator>,
    cache: RefCell<HashMap<PathBuf, ConfigDocument>>,
}

impl ConfigLoader {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self {
            parser: ConfigParser::new(provider),
            validator: RefCell::new(ConfigValidator::new()),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn parser(&self) -> &ConfigParser {
        &self.parser
    }

    /// Load a configuration document from a file.
    ///
    /// The path is resolved to an absolute path before any cache lookup or
    /// file I/O, so relative and absolute references to the same file share a
    /// cache slot. Cached entries are returned as defensive copies.
    pub fn load(
        &self,
        path: &Path,
        validate: bool,
        cache: bool,
    ) -> Result<ConfigDocument, ConfigSystemError> {
        let abs = absolutize(path)?;
        let mut visited = Vec::new();
        self.load_resolved(&abs, validate, cache, &mut visited)
    }

    /// Reload a configuration file, invalidating only its cache entry first.
    pub fn reload(&self, path: &Path, validate: bool) -> Result<ConfigDocument, ConfigSystemError> {
        let abs = absolutize(path)?;
        self.cache.borrow_mut().remove(&abs);
        let mut visited = Vec::new();
        self.load_resolved(&abs, validate, true, &mut visited)
    }

    /// Load a configuration document from a string.
    pub fn load_from_str(
        &self,
        text: &str,
        format: ConfigFormat,
        validate: bool,
    ) -> Result<ConfigDocument, ConfigSystemError> {
        let doc = self.parser.load_from_str(text, format)?;
        if validate {
            self.run_validation(&doc, None)?;
        }
        Ok(doc)
    }

    fn load_resolved(
        &self,
        abs: &Path,
        validate: bool,
        cache: bool,
        visited: &mut Vec<PathBuf>,
    ) -> Result<ConfigDocument, ConfigSystemError> {
        if cache {
            if let Some(doc) = self.cache.borrow().get(abs) {
                debug!("config cache hit: {}", abs.display());
                return Ok(doc.clone());
            }
        }

        if visited.iter().any(|p| p == abs) {
            let mut chain = visited.clone();
            chain.push(abs.to_path_buf());
            return Err(ConfigSystemError::CircularInheritance { chain });
        }
        visited.push(abs.to_path_buf());

        let doc = self.parser.load(abs)?;
        let doc = self.process_inheritance(doc, abs, visited)?;
        visited.pop();

        if validate {
            self.run_validation(&doc, Some(abs))?;
        }
        if cache {
            self.cache
                .borrow_mut()
                .insert(abs.to_path_buf(), doc.clone());
        }
        Ok(doc)
    }

    /// Resolve the `_extends` chain: the base document is loaded recursively
    /// without validation and the current document is merged on top of it.
    /// The marker key never leaks into the returned document.
    fn process_inheritance(
        &self,
        doc: ConfigDocument,
        doc_path: &Path,
        visited: &mut Vec<PathBuf>,
    ) -> Result<ConfigDocument, ConfigSystemError> {
        let Some(extends) = doc.get(EXTENDS_KEY) else {
            return Ok(doc);
        };
        let Some(base_ref) = extends.as_str() else {
            return Err(ConfigSystemError::Structural {
                message: "inheritance reference must be a path string".to_string(),
                field: Some(EXTENDS_KEY.to_string()),
            });
        };

        let base_path = PathBuf::from(base_ref);
        let base_abs = if base_path.is_absolute() {
            base_path
        } else {
            let parent = doc_path.parent().unwrap_or_else(|| Path::new("."));
            absolutize(&parent.join(base_path))?
        };

        debug!("resolving config inheritance: {} extends {}", doc_path.display(), base_abs.display());
        let base_doc = self.load_resolved(&base_abs, false, true, visited)?;
        let mut merged = self.parser.merge(&base_doc, &doc);
        merged.remove(EXTENDS_KEY);
        Ok(merged)
    }

    /// Apply the rule table; a failure surfaces as one aggregated error
    /// carrying every violation, never silently swallowed.
    fn run_validation(
        &self,
        doc: &ConfigDocument,
        path: Option<&Path>,
    ) -> Result<(), ConfigSystemError> {
        let mut validator = self.validator.borrow_mut();
        let valid = validator.validate(doc, false)?;
        if !valid {
            return Err(ConfigSystemError::ValidationFailed {
                path: path.map(Path::to_path_buf),
                errors: validator.errors().to_vec(),
                warnings: validator.warnings().to_vec(),
            });
        }
        Ok(())
    }

    /// Create the default configuration document.
    pub fn create_default(&self) -> ConfigDocument {
        json!({
            "version": "1.0.0",
            "framework": "ascend",
            "agent": {
                "type": "base_agent",
                "config": {
                    "learning_rate": 0.001,
                    "batch_size": 64
                }
            },
            "environment": {
                "type": "base_environment",
                "config": {
                    "max_steps": 1000
                }
            },
            "training": {
                "total_timesteps": 100000,
                "eval_freq": 10000,
                "save_freq": 50000,
                "log_dir": "./logs",
                "checkpoint_dir": "./checkpoints"
            },
            "plugins": []
        })
        .as_object()
        .cloned()
        .unwrap_or_default()
    }

    /// Write the default configuration document to a file.
    pub fn save_default(&self, path: &Path) -> Result<(), ConfigSystemError> {
        let default = self.create_default();
        self.parser.save(&default, path)
    }

    /// Save a configuration document to a file.
    pub fn save(&self, doc: &ConfigDocument, path: &Path) -> Result<(), ConfigSystemError> {
        self.parser.save(doc, path)
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Absolute paths of every cached document.
    pub fn cached_paths(&self) -> Vec<PathBuf> {
        self.cache.borrow().keys().cloned().collect()
    }

    /// Fetch the configuration subtree for a named plugin, if present.
    pub fn plugin_section(doc: &ConfigDocument, plugin_name: &str) -> Option<ConfigDocument> {
        doc.get(plugin_name)
            .and_then(Value::as_object)
            .cloned()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(Arc::new(LocalStorageProvider::new()))
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, ConfigSystemError> {
    std::path::absolute(path)
        .map_err(|e| StorageSystemError::io(e, "absolutize", path.to_path_buf()).into())
}
