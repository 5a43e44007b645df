// [apps/server/src/handlers/action.rs]
//! `POST /server/action/executeBatch` (§6): validates every action against the registry (C6)
//! before dispatch, then runs the batch through the Host Proxy (C8) as one round trip.

use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use fleetmesh_domain_models::Action;
use fleetmesh_domain_navigation::validate_action;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct ExecuteBatchRequest {
    pub host: String,
    pub device_id: String,
    pub session_id: String,
    pub device_model: String,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub retry_actions: Vec<Action>,
}

#[derive(Debug, Serialize)]
pub struct ActionResultDto {
    pub command: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteBatchResponse {
    pub success: bool,
    pub results: Vec<ActionResultDto>,
    pub passed_count: u32,
    pub total_count: u32,
}

#[instrument(skip(state, request), fields(host = %request.host, device_id = %request.device_id))]
pub async fn execute_batch(
    State(state): State<AppState>,
    Json(request): Json<ExecuteBatchRequest>,
) -> Result<Json<ExecuteBatchResponse>, ApiError> {
    let registry = state.commands.list_for_device(&request.device_model).await?;

    for action in request.actions.iter().chain(request.retry_actions.iter()) {
        let outcome = validate_action(&registry, &request.device_model, action);
        if !outcome.ok {
            return Err(ApiError::validation(outcome));
        }
    }

    state.verify_lease_holder(&request.host, &request.device_id, &request.session_id).await?;

    let client = state.host_client(&request.host).map_err(ApiError::transport)?;
    let response = client
        .execute_batch(&request.device_id, &request.session_id, &request.actions, &request.retry_actions)
        .await?;

    Ok(Json(ExecuteBatchResponse {
        success: response.success,
        results: response
            .results
            .into_iter()
            .map(|r| ActionResultDto { command: r.command, success: r.success, error: r.error })
            .collect(),
        passed_count: response.passed_count,
        total_count: response.total_count,
    }))
}
