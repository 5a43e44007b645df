// [apps/server/src/handlers/capture.rs]
//! Internal ingestion endpoint, not part of the stable `/server/...` surface (§6): the host-agent's
//! Capture Ingestor (C9) pushes a frame record here each time it finishes writing a sidecar, so
//! the server's retention daemon and `av` handlers have something to read without reaching into
//! the host's filesystem themselves.

use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use fleetmesh_domain_models::CaptureFrameRecord;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct RecordFrameRequest {
    pub host_name: String,
    #[serde(flatten)]
    pub record: CaptureFrameRecord,
}

#[derive(Debug, Serialize)]
pub struct RecordFrameResponse {
    pub success: bool,
}

#[instrument(skip(state, request), fields(host_name = %request.host_name, device_id = %request.record.device_id))]
pub async fn record_frame(
    State(state): State<AppState>,
    Json(request): Json<RecordFrameRequest>,
) -> Result<Json<RecordFrameResponse>, ApiError> {
    state.captures.record_frame(&request.host_name, &request.record).await?;
    Ok(Json(RecordFrameResponse { success: true }))
}
