// [apps/server/src/services/command_catalog.rs]
//! Default command catalog builder (§4.2, §9 redesign flag: "registration is explicit, not
//! reflective"). Each command kind is hand-listed here and upserted into the registry at
//! ignition for every device_model named in `COMMAND_SEED_DEVICE_MODELS`; nothing is discovered
//! by introspecting a plugin directory.

use fleetmesh_domain_models::{CommandKind, CommandSpec};
use tracing::{info, instrument};

use crate::state::AppState;

const LAUNCH_APP_WAIT_MS: u64 = 8000;
const CLICK_WAIT_MS: u64 = 2000;
const PRESS_KEY_WAIT_MS: u64 = 1000;
const BACK_WAIT_MS: u64 = 1500;
const TYPE_TEXT_WAIT_MS: u64 = 1000;
const WAIT_FOR_ELEMENT_WAIT_MS: u64 = 2000;

/// The baseline command set every device model gets, spanning all four command kinds. A real
/// deployment extends this per device_model rather than replacing it.
pub fn default_catalog(device_model: &str) -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            device_model: device_model.to_string(),
            command_name: "launch_app".into(),
            kind: CommandKind::Remote,
            category: "navigation".into(),
            description: "Launch an application by package or bundle id".into(),
            required_params: vec!["app_id".into()],
            requires_input: true,
            default_wait_time_ms: LAUNCH_APP_WAIT_MS,
        },
        CommandSpec {
            device_model: device_model.to_string(),
            command_name: "click".into(),
            kind: CommandKind::Remote,
            category: "navigation".into(),
            description: "Select the currently focused element".into(),
            required_params: vec![],
            requires_input: false,
            default_wait_time_ms: CLICK_WAIT_MS,
        },
        CommandSpec {
            device_model: device_model.to_string(),
            command_name: "press_key".into(),
            kind: CommandKind::Remote,
            category: "navigation".into(),
            description: "Send a single remote key press".into(),
            required_params: vec!["key".into()],
            requires_input: true,
            default_wait_time_ms: PRESS_KEY_WAIT_MS,
        },
        CommandSpec {
            device_model: device_model.to_string(),
            command_name: "back".into(),
            kind: CommandKind::Remote,
            category: "navigation".into(),
            description: "Navigate to the previous screen".into(),
            required_params: vec![],
            requires_input: false,
            default_wait_time_ms: BACK_WAIT_MS,
        },
        CommandSpec {
            device_model: device_model.to_string(),
            command_name: "type_text".into(),
            kind: CommandKind::Adb,
            category: "input".into(),
            description: "Type text into the focused field via adb input text".into(),
            required_params: vec!["text".into()],
            requires_input: true,
            default_wait_time_ms: TYPE_TEXT_WAIT_MS,
        },
        CommandSpec {
            device_model: device_model.to_string(),
            command_name: "tap_coordinates".into(),
            kind: CommandKind::Adb,
            category: "input".into(),
            description: "Tap an absolute screen coordinate via adb input tap".into(),
            required_params: vec!["x".into(), "y".into()],
            requires_input: true,
            default_wait_time_ms: CLICK_WAIT_MS,
        },
        CommandSpec {
            device_model: device_model.to_string(),
            command_name: "open_url".into(),
            kind: CommandKind::Web,
            category: "navigation".into(),
            description: "Open a URL in the device's default browser surface".into(),
            required_params: vec!["url".into()],
            requires_input: true,
            default_wait_time_ms: LAUNCH_APP_WAIT_MS,
        },
        CommandSpec {
            device_model: device_model.to_string(),
            command_name: "ir_power".into(),
            kind: CommandKind::Ir,
            category: "power".into(),
            description: "Toggle power via the infrared blaster".into(),
            required_params: vec![],
            requires_input: false,
            default_wait_time_ms: LAUNCH_APP_WAIT_MS,
        },
        CommandSpec {
            device_model: device_model.to_string(),
            command_name: "waitForElementToAppear".into(),
            kind: CommandKind::Web,
            category: "web_verification".into(),
            description: "Polls the DOM until a matching element renders or the wait times out".into(),
            required_params: vec!["search_term".into()],
            requires_input: false,
            default_wait_time_ms: WAIT_FOR_ELEMENT_WAIT_MS,
        },
    ]
}

/// Upserts `default_catalog` for every device_model in `AppConfig::command_seed_device_models`.
/// Idempotent: reruns on every restart without duplicating rows (§6 unique constraint).
#[instrument(skip(state))]
pub async fn seed_defaults(state: &AppState) {
    for device_model in &state.config.command_seed_device_models {
        for spec in default_catalog(device_model) {
            if let Err(e) = state.commands.upsert(&spec).await {
                tracing::error!(device_model, command_name = %spec.command_name, error = %e, "failed to seed command");
            }
        }
        info!(device_model, "command catalog seeded");
    }
}
