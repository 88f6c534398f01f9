use serde_json::json;

use crate::config::error::ConfigSystemError;
use crate::config::parser::ConfigDocument;
use crate::config::validator::ConfigValidator;

fn valid_doc() -> ConfigDocument {
    json!({
        "version": "1.0.0",
        "framework": "ascend",
        "agent": {"type": "dqn_agent", "config": {}},
        "environment": {"type": "grid_world", "config": {}},
        "training": {
            "total_timesteps": 100000,
            "learning_rate": 0.001
        },
        "plugins": ["metrics", "replay:>=1.0.0"]
    })
    .as_object()
    .cloned()
    .expect("test doc must be a mapping")
}

#[test]
fn valid_document_passes() {
    let mut validator = ConfigValidator::new();
    let ok = validator
        .validate(&valid_doc(), false)
        .expect("validate returned a hard error");
    assert!(ok, "errors: {:?}", validator.errors());
    assert!(validator.errors().is_empty());
}

#[test]
fn missing_section_is_immediate_error_in_strict_mode() {
    let mut doc = valid_doc();
    doc.remove("training");

    let mut validator = ConfigValidator::new();
    let result = validator.validate(&doc, true);
    assert!(matches!(result, Err(ConfigSystemError::Structural { .. })));
}

#[test]
fn missing_section_is_recorded_in_lenient_mode() {
    let mut doc = valid_doc();
    doc.remove("environment");

    let mut validator = ConfigValidator::new();
    let ok = validator.validate(&doc, false).expect("unexpected hard error");
    assert!(!ok);
    assert_eq!(validator.errors().len(), 1);
    assert!(validator.errors()[0].contains("environment"));
}

#[test]
fn violations_accumulate_across_rules() {
    let mut doc = valid_doc();
    // three independent violations in one pass
    doc.insert("version".to_string(), json!("one-dot-oh"));
    if let Some(training) = doc.get_mut("training").and_then(|v| v.as_object_mut()) {
        training.insert("total_timesteps".to_string(), json!(500));
        training.insert("learning_rate".to_string(), json!(1.5));
    }

    let mut validator = ConfigValidator::new();
    let ok = validator.validate(&doc, false).expect("unexpected hard error");
    assert!(!ok);
    assert_eq!(validator.errors().len(), 3, "errors: {:?}", validator.errors());
}

#[test]
fn type_mismatch_is_reported_with_both_types() {
    let mut doc = valid_doc();
    if let Some(training) = doc.get_mut("training").and_then(|v| v.as_object_mut()) {
        training.insert("total_timesteps".to_string(), json!("lots"));
    }

    let mut validator = ConfigValidator::new();
    validator.validate(&doc, false).expect("unexpected hard error");
    let message = validator
        .errors()
        .iter()
        .find(|e| e.contains("total_timesteps"))
        .expect("expected a type error for total_timesteps");
    assert!(message.contains("integer"));
    assert!(message.contains("string"));
}

#[test]
fn framework_value_must_be_allowed() {
    let mut doc = valid_doc();
    doc.insert("framework".to_string(), json!("other"));

    let mut validator = ConfigValidator::new();
    let ok = validator.validate(&doc, false).expect("unexpected hard error");
    assert!(!ok);
    assert!(validator.errors().iter().any(|e| e.contains("framework")));
}

#[test]
fn empty_component_type_fails_min_length() {
    let mut doc = valid_doc();
    if let Some(agent) = doc.get_mut("agent").and_then(|v| v.as_object_mut()) {
        agent.insert("type".to_string(), json!(""));
    }

    let mut validator = ConfigValidator::new();
    let ok = validator.validate(&doc, false).expect("unexpected hard error");
    assert!(!ok);
    assert!(validator.errors().iter().any(|e| e.contains("agent.type")));
}

#[test]
fn component_entry_without_type_warns() {
    let mut doc = valid_doc();
    doc.insert(
        "models".to_string(),
        json!({"policy_net": {"hidden": 256}}),
    );

    let mut validator = ConfigValidator::new();
    let ok = validator.validate(&doc, false).expect("unexpected hard error");
    assert!(ok, "warnings must not fail validation");
    assert!(
        validator
            .warnings()
            .iter()
            .any(|w| w.contains("models.policy_net"))
    );
}

#[test]
fn plugin_list_entries_must_be_strings() {
    let mut doc = valid_doc();
    doc.insert("plugins".to_string(), json!(["metrics", 42]));

    let mut validator = ConfigValidator::new();
    let ok = validator.validate(&doc, false).expect("unexpected hard error");
    assert!(!ok);
    assert!(validator.errors().iter().any(|e| e.contains("Plugins")));
}

#[test]
fn missing_path_parent_warns_only() {
    let mut doc = valid_doc();
    if let Some(training) = doc.get_mut("training").and_then(|v| v.as_object_mut()) {
        training.insert(
            "log_dir".to_string(),
            json!("/nonexistent/ascend-test/logs"),
        );
    }

    let mut validator = ConfigValidator::new();
    let ok = validator.validate(&doc, false).expect("unexpected hard error");
    assert!(ok);
    assert!(validator.warnings().iter().any(|w| w.contains("log_dir")));
}

#[test]
fn clear_resets_recorded_results() {
    let mut doc = valid_doc();
    doc.remove("agent");

    let mut validator = ConfigValidator::new();
    let _ = validator.validate(&doc, false).expect("unexpected hard error");
    assert!(!validator.errors().is_empty());

    validator.clear();
    assert!(validator.errors().is_empty());
    assert!(validator.warnings().is_empty());
}
