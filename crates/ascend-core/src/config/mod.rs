//! # Ascend Core Configuration
//!
//! Layered configuration for the framework and its plugins:
//!
//! - [`parser`]: format detection, document parsing, environment-variable
//!   substitution, and deep merging.
//! - [`validator`]: declarative field-rule table applied with full error
//!   accumulation.
//! - [`loader`]: the high-level entry point, adding inheritance resolution
//!   and per-path caching on top of the parser and validator.
//!
//! Documents are ordered mappings ([`ConfigDocument`]); key order survives a
//! load/save round trip.

pub mod error;
pub mod loader;
pub mod parser;
pub mod validator;

pub use error::ConfigSystemError;
pub use loader::{ConfigLoader, EXTENDS_KEY};
pub use parser::{ConfigDocument, ConfigFormat, ConfigParser, FRAMEWORK_KEY};
pub use validator::{ConfigValidator, FieldRule, RuleType};

#[cfg(test)]
mod tests;
