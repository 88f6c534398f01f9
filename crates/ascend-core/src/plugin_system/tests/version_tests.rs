use crate::plugin_system::version::{parse_plugin_spec, parse_version, satisfies};

#[test]
fn spec_without_constraint_is_bare_name() {
    assert_eq!(parse_plugin_spec("metrics"), ("metrics".to_string(), None));
    assert_eq!(parse_plugin_spec("  metrics  "), ("metrics".to_string(), None));
}

#[test]
fn spec_splits_at_first_colon() {
    assert_eq!(
        parse_plugin_spec("metrics:>=1.2.0"),
        ("metrics".to_string(), Some(">=1.2.0".to_string()))
    );
    assert_eq!(
        parse_plugin_spec("metrics : >=1.2.0 "),
        ("metrics".to_string(), Some(">=1.2.0".to_string()))
    );
}

#[test]
fn spec_with_empty_constraint_collapses_to_none() {
    assert_eq!(parse_plugin_spec("metrics:"), ("metrics".to_string(), None));
    assert_eq!(parse_plugin_spec("metrics:  "), ("metrics".to_string(), None));
}

#[test]
fn absent_or_empty_constraint_is_trivially_satisfied() {
    assert!(satisfies("1.0.0", None));
    assert!(satisfies("1.0.0", Some("")));
    assert!(satisfies("1.0.0", Some("   ")));
}

#[test]
fn present_constraint_rejects_missing_version() {
    assert!(!satisfies("", Some(">=1.0.0")));
    assert!(!satisfies("  ", Some(">=1.0.0")));
}

#[test]
fn semver_requirements_are_evaluated() {
    assert!(satisfies("2.1.0", Some(">=2.0.0")));
    assert!(!satisfies("1.5.0", Some(">=2.0.0")));
    assert!(satisfies("1.9.3", Some("^1.2")));
    assert!(!satisfies("2.0.0", Some("^1.2")));
    assert!(satisfies("1.2.3", Some("=1.2.3")));
}

#[test]
fn prefix_operators_cover_double_equals() {
    // "==" is not semver requirement syntax, the manual fallback handles it
    assert!(satisfies("1.2.3", Some("==1.2.3")));
    assert!(!satisfies("1.2.4", Some("==1.2.3")));
}

#[test]
fn prefix_operator_ordering_table() {
    assert!(satisfies("1.0.1", Some(">1.0.0")));
    assert!(!satisfies("1.0.0", Some(">1.0.0")));
    assert!(satisfies("0.9.0", Some("<1.0.0")));
    assert!(satisfies("1.0.0", Some("<=1.0.0")));
    assert!(!satisfies("1.0.1", Some("<=1.0.0")));
}

#[test]
fn non_semver_versions_fall_back_to_string_equality() {
    assert!(satisfies("nightly", Some("nightly")));
    assert!(!satisfies("nightly", Some("stable")));
    assert!(!satisfies("nightly", Some(">=1.0.0")));
}

#[test]
fn parse_version_rejects_partial_versions() {
    assert!(parse_version("1.2.3").is_ok());
    assert!(parse_version("1.2").is_err());
    assert!(parse_version("not-a-version").is_err());
}
