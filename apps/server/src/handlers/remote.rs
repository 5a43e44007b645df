// [apps/server/src/handlers/remote.rs]
//! `POST /server/remote/executeCommand` (§6): validates the command against the registry (C6),
//! then dispatches it to the device's host-agent over the Host Proxy (C8).

use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use fleetmesh_domain_models::Action;
use fleetmesh_domain_navigation::validate_action;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct ExecuteCommandRequest {
    pub host_name: String,
    pub command: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub device_id: Option<String>,
    pub session_id: String,
    pub device_model: String,
}

#[derive(Debug, Serialize)]
pub struct ExecuteCommandResponse {
    pub success: bool,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

#[instrument(skip(state, request), fields(host_name = %request.host_name, command = %request.command))]
pub async fn execute_command(
    State(state): State<AppState>,
    Json(request): Json<ExecuteCommandRequest>,
) -> Result<Json<ExecuteCommandResponse>, ApiError> {
    let action = Action { command: request.command.clone(), params: request.params };

    let registry = state.commands.list_for_device(&request.device_model).await?;
    let outcome = validate_action(&registry, &request.device_model, &action);
    if !outcome.ok {
        return Err(ApiError::validation(outcome));
    }

    let device_id = request.device_id.as_deref().unwrap_or(&request.session_id);
    state.verify_lease_holder(&request.host_name, device_id, &request.session_id).await?;

    let client = state
        .host_client(&request.host_name)
        .map_err(ApiError::transport)?;

    let response = client.execute_action(device_id, &request.session_id, &action).await?;
    Ok(Json(ExecuteCommandResponse {
        success: response.success,
        result: response.result,
        error: response.error,
    }))
}
