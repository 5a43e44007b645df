//! [libs/domain/models/src/command.rs]
//! Command Registry entities (C2, §4.2) and the validation outcome shared by C6.

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Remote,
    Adb,
    Web,
    Ir,
}

/// `{ device_model, command_name, kind, params_schema, category, description }`, unique by
/// `(device_model, command_name)` (§3, §6).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
    pub device_model: String,
    pub command_name: String,
    pub kind: CommandKind,
    pub category: String,
    pub description: String,
    /// Names of parameters this command requires, with an optional default baseline
    /// `wait_time_ms` per §4.2 (launch_app 8000, click 2000, press_key 1000, back 1500,
    /// type_text 1000).
    pub required_params: Vec<String>,
    pub requires_input: bool,
    pub default_wait_time_ms: u64,
}

/// Result of `validateParams` (C2) / the write-time validator (C6).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub ok: bool,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
    /// Populated only on rejection: the full catalog for the device_model, grouped by category.
    #[serde(default)]
    pub available_commands: Vec<CommandSpec>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    /// Warnings (missing optional params) never block the write; only blocking issues do (§4.6).
    pub blocking: bool,
}
