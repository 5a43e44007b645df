// [libs/domain/navigation/src/validator.rs]
//! Action/Verification Validator (C6, spec §4.6). Invoked on every write to a node's
//! verifications or an edge's action_sets; rejects malformed commands before they reach the
//! store.

use fleetmesh_domain_models::{
    Action, CommandSpec, ValidationIssue, ValidationOutcome, Verification, VerificationType,
};

/// Looks up `command` (case-sensitive, matching `CommandSpec::command_name`) for `device_model`
/// in `registry`. Rejects with the full per-category catalog and a Levenshtein-nearest
/// suggestion when the registry has no such command.
fn lookup_command<'a>(
    registry: &'a [CommandSpec],
    device_model: &str,
    command_name: &str,
) -> Result<&'a CommandSpec, ValidationOutcome> {
    let for_device: Vec<&CommandSpec> = registry
        .iter()
        .filter(|c| c.device_model == device_model)
        .collect();

    if let Some(spec) = for_device.iter().find(|c| c.command_name == command_name) {
        return Ok(spec);
    }

    Err(ValidationOutcome {
        ok: false,
        issues: vec![ValidationIssue {
            field: "command".into(),
            message: format!("unknown command '{command_name}' for device model '{device_model}'"),
            blocking: true,
        }],
        available_commands: for_device.into_iter().cloned().collect(),
        suggestion: suggest_command(registry, device_model, command_name),
    })
}

/// Nearest command name by normalized Levenshtein similarity (`strsim::normalized_levenshtein`),
/// only offered above a confidence floor so wildly unrelated names get no suggestion at all.
const SUGGESTION_SIMILARITY_FLOOR: f64 = 0.5;

fn suggest_command(registry: &[CommandSpec], device_model: &str, command_name: &str) -> Option<String> {
    registry
        .iter()
        .filter(|c| c.device_model == device_model)
        .map(|c| (c.command_name.as_str(), strsim::normalized_levenshtein(command_name, &c.command_name)))
        .filter(|(_, score)| *score >= SUGGESTION_SIMILARITY_FLOOR)
        .max_by(|a, b| a.1.partial_cmp(&b.1).expect("similarity scores are finite"))
        .map(|(name, _)| name.to_string())
}

/// Validates a single action against its registry entry: the command must exist for the
/// device_model, and every name in `required_params` must be present (missing required params
/// are blocking; this function does not itself know about `requires_input`'s `inputValue`,
/// which is checked by [`validate_verification`] callers at the edge/action-set level for
/// verifications specifically, per §4.6).
pub fn validate_action(registry: &[CommandSpec], device_model: &str, action: &Action) -> ValidationOutcome {
    let spec = match lookup_command(registry, device_model, &action.command) {
        Ok(spec) => spec,
        Err(outcome) => return outcome,
    };

    let mut issues = Vec::new();
    for required in &spec.required_params {
        if !action.params.contains_key(required) {
            issues.push(ValidationIssue {
                field: required.clone(),
                message: format!("missing required param '{required}' for command '{}'", spec.command_name),
                blocking: true,
            });
        }
    }

    if spec.requires_input && !action.params.contains_key("inputValue") {
        issues.push(ValidationIssue {
            field: "inputValue".into(),
            message: format!("command '{}' requires an input value", spec.command_name),
            blocking: true,
        });
    }

    let ok = !issues.iter().any(|i| i.blocking);
    ValidationOutcome {
        ok,
        issues,
        available_commands: Vec::new(),
        suggestion: None,
    }
}

/// Validates a verification: the command must exist for the device_model, image verifications
/// require `params.image_path`, text verifications require `params.text`, and `requires_input`
/// commands require `inputValue`. Missing optional params (anything in `required_params` beyond
/// these type-specific ones) downgrade to a non-blocking warning rather than a rejection.
pub fn validate_verification(
    registry: &[CommandSpec],
    device_model: &str,
    verification: &Verification,
) -> ValidationOutcome {
    let spec = match lookup_command(registry, device_model, &verification.command) {
        Ok(spec) => spec,
        Err(outcome) => return outcome,
    };

    let mut issues = Vec::new();

    match verification.verification_type {
        VerificationType::Image if !verification.params.contains_key("image_path") => {
            issues.push(ValidationIssue {
                field: "image_path".into(),
                message: "image verification requires params.image_path".into(),
                blocking: true,
            });
        }
        VerificationType::Text if !verification.params.contains_key("text") => {
            issues.push(ValidationIssue {
                field: "text".into(),
                message: "text verification requires params.text".into(),
                blocking: true,
            });
        }
        _ => {}
    }

    if spec.requires_input && !verification.params.contains_key("inputValue") {
        issues.push(ValidationIssue {
            field: "inputValue".into(),
            message: format!("command '{}' requires an input value", spec.command_name),
            blocking: true,
        });
    }

    for required in &spec.required_params {
        if !verification.params.contains_key(required) {
            issues.push(ValidationIssue {
                field: required.clone(),
                message: format!("optional param '{required}' not supplied for '{}'", spec.command_name),
                blocking: false,
            });
        }
    }

    let ok = !issues.iter().any(|i| i.blocking);
    ValidationOutcome {
        ok,
        issues,
        available_commands: Vec::new(),
        suggestion: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetmesh_domain_models::CommandKind;
    use serde_json::json;

    fn registry() -> Vec<CommandSpec> {
        vec![
            CommandSpec {
                device_model: "host_vnc".into(),
                command_name: "click".into(),
                kind: CommandKind::Remote,
                category: "navigation".into(),
                description: "click at a point".into(),
                required_params: vec!["x".into(), "y".into()],
                requires_input: false,
                default_wait_time_ms: 2000,
            },
            CommandSpec {
                device_model: "host_vnc".into(),
                command_name: "type_text".into(),
                kind: CommandKind::Remote,
                category: "input".into(),
                description: "type text into the focused field".into(),
                required_params: vec![],
                requires_input: true,
                default_wait_time_ms: 1000,
            },
        ]
    }

    fn action(command: &str, params: serde_json::Value) -> Action {
        Action {
            command: command.into(),
            params: params.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn unknown_command_is_rejected_with_catalog_and_suggestion() {
        let outcome = validate_action(&registry(), "host_vnc", &action("clikc", json!({})));
        assert!(!outcome.ok);
        assert_eq!(outcome.available_commands.len(), 2);
        assert_eq!(outcome.suggestion.as_deref(), Some("click"));
    }

    #[test]
    fn unknown_web_verification_suggests_nearest_registered_command() {
        let mut catalog = registry();
        catalog.push(CommandSpec {
            device_model: "host_vnc".into(),
            command_name: "waitForElementToAppear".into(),
            kind: CommandKind::Web,
            category: "web_verification".into(),
            description: "Polls the DOM until a matching element renders".into(),
            required_params: vec!["search_term".into()],
            requires_input: false,
            default_wait_time_ms: 2000,
        });

        let v = Verification {
            command: "check_element_exists".into(),
            verification_type: VerificationType::Text,
            params: json!({"search_term": "Sauce Demo"}).as_object().cloned().unwrap(),
            pass_condition: None,
        };
        let outcome = validate_verification(&catalog, "host_vnc", &v);
        assert!(!outcome.ok);
        assert_eq!(outcome.available_commands.len(), 3);
        assert_eq!(outcome.suggestion.as_deref(), Some("waitForElementToAppear"));
    }

    #[test]
    fn missing_required_param_blocks() {
        let outcome = validate_action(&registry(), "host_vnc", &action("click", json!({"x": 1})));
        assert!(!outcome.ok);
        assert!(outcome.issues.iter().any(|i| i.field == "y" && i.blocking));
    }

    #[test]
    fn requires_input_without_input_value_blocks() {
        let outcome = validate_action(&registry(), "host_vnc", &action("type_text", json!({})));
        assert!(!outcome.ok);
        assert!(outcome.issues.iter().any(|i| i.field == "inputValue"));
    }

    #[test]
    fn image_verification_without_image_path_blocks() {
        let v = Verification {
            command: "click".into(),
            verification_type: VerificationType::Image,
            params: json!({"x": 1, "y": 2}).as_object().cloned().unwrap(),
            pass_condition: None,
        };
        let outcome = validate_verification(&registry(), "host_vnc", &v);
        assert!(!outcome.ok);
        assert!(outcome.issues.iter().any(|i| i.field == "image_path" && i.blocking));
    }

    #[test]
    fn missing_optional_param_is_a_non_blocking_warning() {
        let v = Verification {
            command: "click".into(),
            verification_type: VerificationType::Text,
            params: json!({"text": "hi", "x": 1}).as_object().cloned().unwrap(),
            pass_condition: None,
        };
        let outcome = validate_verification(&registry(), "host_vnc", &v);
        assert!(outcome.ok);
        assert!(outcome.issues.iter().any(|i| i.field == "y" && !i.blocking));
    }
}
