use std::cmp::Ordering;

use semver::{Version, VersionReq};
use thiserror::Error;

/// Error type for version parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },
    #[error("Invalid version constraint '{constraint}': {message}")]
    InvalidConstraint { constraint: String, message: String },
}

/// Split a plugin specifier into its name and optional version constraint.
///
/// A specifier is either a bare name (`"metrics"`) or `name:constraint`
/// (`"metrics:>=1.2.0"`); the split happens at the first `:` and both sides
/// are trimmed. An empty constraint collapses to `None`.
pub fn parse_plugin_spec(spec: &str) -> (String, Option<String>) {
    match spec.split_once(':') {
        Some((name, constraint)) => {
            let constraint = constraint.trim();
            if constraint.is_empty() {
                (name.trim().to_string(), None)
            } else {
                (name.trim().to_string(), Some(constraint.to_string()))
            }
        }
        None => (spec.trim().to_string(), None),
    }
}

/// Parse a version string into a full semantic version.
pub fn parse_version(version: &str) -> Result<Version, VersionError> {
    Version::parse(version.trim()).map_err(|e| VersionError::InvalidVersion {
        version: version.to_string(),
        message: e.to_string(),
    })
}

/// Comparison operators accepted by the manual constraint fallback, longest
/// prefixes first so `>=` is never read as `>`.
const PREFIX_OPERATORS: [(&str, fn(Ordering) -> bool); 6] = [
    (">=", Ordering::is_ge),
    ("<=", Ordering::is_le),
    ("==", Ordering::is_eq),
    (">", Ordering::is_gt),
    ("<", Ordering::is_lt),
    ("=", Ordering::is_eq),
];

/// Check whether a plugin version satisfies a constraint.
///
/// An absent or empty constraint is trivially satisfied; a present constraint
/// is never satisfied by a missing version. Evaluation tries three layers in
/// order: a full `semver::VersionReq` match, a manual prefix-operator
/// comparison, and finally exact string equality.
pub fn satisfies(actual: &str, constraint: Option<&str>) -> bool {
    let Some(constraint) = constraint else {
        return true;
    };
    let constraint = constraint.trim();
    if constraint.is_empty() {
        return true;
    }
    let actual = actual.trim();
    if actual.is_empty() {
        return false;
    }

    if let Ok(version) = Version::parse(actual) {
        if let Ok(req) = VersionReq::parse(constraint) {
            return req.matches(&version);
        }
        for (prefix, accepts) in PREFIX_OPERATORS {
            if let Some(bound) = constraint.strip_prefix(prefix) {
                if let Ok(bound) = Version::parse(bound.trim()) {
                    return accepts(version.cmp(&bound));
                }
                break;
            }
        }
    }

    actual == constraint
}
