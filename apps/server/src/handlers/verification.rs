// [apps/server/src/handlers/verification.rs]
//! `POST /server/verification/execute` (§6): validates every verification against the registry
//! (C6), then runs them through the Host Proxy (C8).

use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use fleetmesh_domain_models::Verification;
use fleetmesh_domain_navigation::validate_verification;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct ExecuteVerificationRequest {
    pub host: String,
    pub device_id: String,
    pub session_id: String,
    pub device_model: String,
    pub verifications: Vec<Verification>,
}

#[derive(Debug, Serialize)]
pub struct VerificationResultDto {
    pub command: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteVerificationResponse {
    pub success: bool,
    pub results: Vec<VerificationResultDto>,
    pub passed_count: u32,
    pub total_count: u32,
}

#[instrument(skip(state, request), fields(host = %request.host, device_id = %request.device_id))]
pub async fn execute_verification(
    State(state): State<AppState>,
    Json(request): Json<ExecuteVerificationRequest>,
) -> Result<Json<ExecuteVerificationResponse>, ApiError> {
    let registry = state.commands.list_for_device(&request.device_model).await?;

    for verification in &request.verifications {
        let outcome = validate_verification(&registry, &request.device_model, verification);
        if !outcome.ok {
            return Err(ApiError::validation(outcome));
        }
    }

    state.verify_lease_holder(&request.host, &request.device_id, &request.session_id).await?;

    let client = state.host_client(&request.host).map_err(ApiError::transport)?;
    let response = client
        .execute_verification(&request.device_id, &request.session_id, &request.verifications)
        .await?;

    Ok(Json(ExecuteVerificationResponse {
        success: response.success,
        results: response
            .results
            .into_iter()
            .map(|r| VerificationResultDto { command: r.command, success: r.success, error: r.error })
            .collect(),
        passed_count: response.passed_count,
        total_count: response.total_count,
    }))
}
