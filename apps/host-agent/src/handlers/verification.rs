// [apps/host-agent/src/handlers/verification.rs]
//! `POST /host/executeVerification` (§6). Verification commands are dispatched through the same
//! per-device driver as actions (§4.6 validated their shape already); the driver backend is the
//! one that actually knows how to decide pass/fail for `image`/`text`/`web`/`adb`/`video`/`audio`
//! checks against the live device.

use crate::errors::HostAgentError;
use crate::state::HostAgentState;
use axum::extract::State;
use axum::Json;
use fleetmesh_domain_models::{Action, PassCondition, Verification};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct ExecuteVerificationRequest {
    pub device_id: String,
    pub session_id: String,
    pub verifications: Vec<Verification>,
}

#[derive(Debug, Serialize)]
pub struct VerificationResult {
    pub command: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteVerificationResponse {
    pub success: bool,
    pub results: Vec<VerificationResult>,
    pub passed_count: u32,
    pub total_count: u32,
}

#[instrument(skip(state, request), fields(device_id = %request.device_id))]
pub async fn execute_verification(
    State(state): State<HostAgentState>,
    Json(request): Json<ExecuteVerificationRequest>,
) -> Result<Json<ExecuteVerificationResponse>, HostAgentError> {
    state.lease_cache.check(&request.device_id, &request.session_id).await?;

    let mut results = Vec::with_capacity(request.verifications.len());
    for verification in &request.verifications {
        let action = Action { command: verification.command.clone(), params: verification.params.clone() };
        let outcome = state.drivers.dispatch(&request.device_id, &action).await;
        results.push(match outcome {
            Ok(_) => VerificationResult { command: verification.command.clone(), success: true, error: None },
            Err(e) => VerificationResult { command: verification.command.clone(), success: false, error: Some(e.to_string()) },
        });
    }

    let passed_count = results.iter().filter(|r| r.success).count() as u32;
    let total_count = results.len() as u32;
    let pass_condition = request.verifications.first().and_then(|v| v.pass_condition).unwrap_or_default();
    let success = match pass_condition {
        PassCondition::All => passed_count == total_count,
        PassCondition::Any => passed_count > 0,
    };

    Ok(Json(ExecuteVerificationResponse { success, results, passed_count, total_count }))
}
