// [apps/server/src/handlers/control.rs]
//! Lock Manager (C7) HTTP surface: `POST /server/control/takeControl`,
//! `POST /server/control/releaseControl` (§6).

use crate::errors::ApiError;
use crate::services::event_bus::DomainEvent;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use fleetmesh_domain_models::TakeControlRequest;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[instrument(skip(state))]
pub async fn take_control(
    State(state): State<AppState>,
    Json(request): Json<TakeControlRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let expires_at = Utc::now() + chrono::Duration::from_std(state.config.lease_grace_window).unwrap_or_default();

    let lease = state
        .leases
        .take_control(
            &request.host_name,
            &request.device_id,
            &request.session_id,
            &request.user_id,
            request.tree_id.as_deref(),
            expires_at,
        )
        .await?;

    state.event_bus.publish(DomainEvent::LeaseAcquired(lease));
    Ok(Json(OkResponse { ok: true }))
}

#[derive(Debug, serde::Deserialize)]
pub struct ReleaseControlRequest {
    pub host_name: String,
    pub device_id: String,
    pub session_id: String,
}

#[instrument(skip(state))]
pub async fn release_control(
    State(state): State<AppState>,
    Json(request): Json<ReleaseControlRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .leases
        .release_control(&request.host_name, &request.device_id, &request.session_id)
        .await?;

    state.event_bus.publish(DomainEvent::LeaseReleased {
        host_name: request.host_name,
        device_id: request.device_id,
    });
    Ok(Json(serde_json::json!({ "ok": true })))
}
