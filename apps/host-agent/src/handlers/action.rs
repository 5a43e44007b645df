// [apps/host-agent/src/handlers/action.rs]
//! `POST /host/executeAction`, `POST /host/executeBatch` (§6).

use crate::errors::HostAgentError;
use crate::state::HostAgentState;
use axum::extract::State;
use axum::Json;
use fleetmesh_domain_models::Action;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct ExecuteActionRequest {
    pub device_id: String,
    pub session_id: String,
    pub action: Action,
}

#[derive(Debug, Serialize)]
pub struct ExecuteActionResponse {
    pub success: bool,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

#[instrument(skip(state, request), fields(device_id = %request.device_id, command = %request.action.command))]
pub async fn execute_action(
    State(state): State<HostAgentState>,
    Json(request): Json<ExecuteActionRequest>,
) -> Result<Json<ExecuteActionResponse>, HostAgentError> {
    state.lease_cache.check(&request.device_id, &request.session_id).await?;

    let wait_ms = request.action.wait_time_ms();
    let outcome = state.drivers.dispatch(&request.device_id, &request.action).await;
    if wait_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(wait_ms)).await;
    }

    Ok(Json(match outcome {
        Ok(result) => ExecuteActionResponse { success: true, result: Some(result), error: None },
        Err(e) => ExecuteActionResponse { success: false, result: None, error: Some(e.to_string()) },
    }))
}

#[derive(Debug, Deserialize)]
pub struct ExecuteBatchRequest {
    pub device_id: String,
    pub session_id: String,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub retry_actions: Vec<Action>,
}

#[derive(Debug, Serialize)]
pub struct ActionResult {
    pub command: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteBatchResponse {
    pub success: bool,
    pub results: Vec<ActionResult>,
    pub passed_count: u32,
    pub total_count: u32,
}

/// Partial failures return per-action results rather than failing the whole batch (§4.8); on a
/// failure the batch falls through to `retry_actions` once before giving up on that action.
#[instrument(skip(state, request), fields(device_id = %request.device_id))]
pub async fn execute_batch(
    State(state): State<HostAgentState>,
    Json(request): Json<ExecuteBatchRequest>,
) -> Result<Json<ExecuteBatchResponse>, HostAgentError> {
    state.lease_cache.check(&request.device_id, &request.session_id).await?;

    let mut results = Vec::with_capacity(request.actions.len());
    for action in &request.actions {
        let mut outcome = state.drivers.dispatch(&request.device_id, action).await;
        if outcome.is_err() {
            if let Some(retry) = request.retry_actions.iter().find(|r| r.command == action.command) {
                outcome = state.drivers.dispatch(&request.device_id, retry).await;
            }
        }
        let wait_ms = action.wait_time_ms();
        if wait_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(wait_ms)).await;
        }
        results.push(match outcome {
            Ok(_) => ActionResult { command: action.command.clone(), success: true, error: None },
            Err(e) => ActionResult { command: action.command.clone(), success: false, error: Some(e.to_string()) },
        });
    }

    let passed_count = results.iter().filter(|r| r.success).count() as u32;
    let total_count = results.len() as u32;
    Ok(Json(ExecuteBatchResponse { success: passed_count == total_count, results, passed_count, total_count }))
}
