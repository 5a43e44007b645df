//! External integration test wired via `[[test]] name = "models_integrity"` in Cargo.toml,
//! matching the crate's existing convention of keeping round-trip checks outside `lib.rs`.

use fleetmesh_domain_models::*;
use serde_json;

#[test]
fn action_wait_time_lives_inside_params() {
    let action: Action = serde_json::from_value(serde_json::json!({
        "command": "click_element",
        "params": { "id": "Settings", "wait_time_ms": 2000 }
    }))
    .unwrap();

    assert_eq!(action.wait_time_ms(), 2000);
    assert!(serde_json::to_value(&action).unwrap().get("wait_time_ms").is_none());
}

#[test]
fn navigation_edge_round_trips_through_json() {
    let edge = NavigationEdge {
        tree_id: "t1".into(),
        edge_id: "e1".into(),
        source_node_id: "home".into(),
        target_node_id: "settings".into(),
        action_sets: vec![ActionSet {
            action_set_id: "open".into(),
            label: "Open".into(),
            actions: vec![Action {
                command: "click_element".into(),
                params: serde_json::json!({ "id": "Settings", "wait_time_ms": 2000 })
                    .as_object()
                    .unwrap()
                    .clone(),
            }],
            retry_actions: vec![],
            failure_actions: vec![],
        }],
        default_action_set_id: "open".into(),
        final_wait_ms: 500,
    };

    let json = serde_json::to_string(&edge).unwrap();
    let restored: NavigationEdge = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.edge_id, edge.edge_id);
    assert_eq!(restored.weight_via("open"), edge.weight_via("open"));
}

#[test]
fn take_control_error_wire_values_are_snake_case() {
    assert_eq!(TakeControlError::DeviceLocked.as_str(), "device_locked");
    let json = serde_json::to_value(TakeControlError::StreamServiceError).unwrap();
    assert_eq!(json, "stream_service_error");
}

#[test]
fn validation_outcome_round_trips_available_commands_and_suggestion() {
    let spec = CommandSpec {
        device_model: "host_vnc".into(),
        command_name: "waitForElementToAppear".into(),
        kind: CommandKind::Web,
        category: "web_verification".into(),
        description: "Waits for a DOM element to render".into(),
        required_params: vec!["search_term".into()],
        requires_input: false,
        default_wait_time_ms: 2000,
    };
    let outcome = ValidationOutcome {
        ok: false,
        issues: vec![ValidationIssue {
            field: "command".into(),
            message: "unknown command check_element_exists".into(),
            blocking: true,
        }],
        available_commands: vec![spec],
        suggestion: Some("waitForElementToAppear".into()),
    };

    let json = serde_json::to_string(&outcome).unwrap();
    let restored: ValidationOutcome = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.available_commands.len(), 1);
    assert_eq!(restored.suggestion.as_deref(), Some("waitForElementToAppear"));
}
