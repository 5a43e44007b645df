// [apps/server/src/handlers/zap.rs]
//! C12's hook into the Zap Detector (C11), which runs inside the host-agent process: the server
//! only verifies the lease, proxies to the host and persists the resulting event (§4.11, §4.12
//! step 2, "ambient persistence shape").

use crate::errors::ApiError;
use crate::services::event_bus::DomainEvent;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct ZapResetRequest {
    pub host: String,
    pub device_id: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[instrument(skip(state), fields(host = %request.host, device_id = %request.device_id))]
pub async fn reset_zap(
    State(state): State<AppState>,
    Json(request): Json<ZapResetRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    state.verify_lease_holder(&request.host, &request.device_id, &request.session_id).await?;
    let client = state.host_client(&request.host).map_err(ApiError::transport)?;
    client.zap_reset(&request.device_id, &request.session_id).await?;
    Ok(Json(OkResponse { ok: true }))
}

#[derive(Debug, Deserialize)]
pub struct ZapObserveRequest {
    pub host: String,
    pub device_id: String,
    pub session_id: String,
    pub action_command: String,
    pub key_release_ts: f64,
}

#[derive(Debug, Serialize)]
pub struct ZapObserveResponse {
    pub event: fleetmesh_domain_models::ZapEvent,
}

#[instrument(skip(state), fields(host = %request.host, device_id = %request.device_id))]
pub async fn observe_zap(
    State(state): State<AppState>,
    Json(request): Json<ZapObserveRequest>,
) -> Result<Json<ZapObserveResponse>, ApiError> {
    state.verify_lease_holder(&request.host, &request.device_id, &request.session_id).await?;
    let client = state.host_client(&request.host).map_err(ApiError::transport)?;
    let response = client
        .zap_observe(&request.device_id, &request.session_id, &request.action_command, request.key_release_ts)
        .await?;

    state.zap_events.record(&request.host, &response.event).await?;
    state.event_bus.publish(DomainEvent::ZapDetected(response.event.clone()));

    Ok(Json(ZapObserveResponse { event: response.event }))
}
