// [apps/host-agent/src/handlers/zap.rs]
//! `POST /host/zap/reset`, `POST /host/zap/observe` (§4.12): C12 resets per-device zap state at
//! script setup, then invokes the detector once per zap event at the action's key-release time.

use crate::errors::HostAgentError;
use crate::state::HostAgentState;
use axum::extract::State;
use axum::Json;
use fleetmesh_domain_models::ZapEvent;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct ZapResetRequest {
    pub device_id: String,
    pub session_id: String,
}

#[instrument(skip(state), fields(device_id = %request.device_id))]
pub async fn reset_zap(
    State(state): State<HostAgentState>,
    Json(request): Json<ZapResetRequest>,
) -> Result<Json<serde_json::Value>, HostAgentError> {
    state.lease_cache.check(&request.device_id, &request.session_id).await?;
    state.zap_registry.reset(&request.device_id);
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
pub struct ZapObserveRequest {
    pub device_id: String,
    pub session_id: String,
    pub action_command: String,
    pub key_release_ts: f64,
}

#[derive(Debug, Serialize)]
pub struct ZapObserveResponse {
    pub event: ZapEvent,
}

#[instrument(skip(state), fields(device_id = %request.device_id))]
pub async fn observe_zap(
    State(state): State<HostAgentState>,
    Json(request): Json<ZapObserveRequest>,
) -> Result<Json<ZapObserveResponse>, HostAgentError> {
    state.lease_cache.check(&request.device_id, &request.session_id).await?;
    let event = state
        .zap_registry
        .observe(
            &request.device_id,
            &request.action_command,
            request.key_release_ts,
            &state.window_history,
            state.ai_gateway.as_ref(),
        )
        .await;
    Ok(Json(ZapObserveResponse { event }))
}
