// [apps/host-agent/src/handlers/av.rs]
//! `POST /host/takeScreenshot`, `POST /host/getLatestJson`, `POST /host/recentSegments` (§6),
//! served from this host-agent's own capture cache rather than round-tripping to the server's
//! `CaptureRepository`.

use crate::errors::HostAgentError;
use crate::state::HostAgentState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

#[derive(Debug, Deserialize)]
pub struct AvRequest {
    pub device_id: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct TakeScreenshotResponse {
    pub success: bool,
    pub screenshot_url: Option<String>,
}

#[instrument(skip(state), fields(device_id = %request.device_id))]
pub async fn take_screenshot(
    State(state): State<HostAgentState>,
    Json(request): Json<AvRequest>,
) -> Result<Json<TakeScreenshotResponse>, HostAgentError> {
    state.lease_cache.check(&request.device_id, &request.session_id).await?;
    let record = state.latest(&request.device_id)?;
    Ok(Json(TakeScreenshotResponse { success: true, screenshot_url: Some(record.image_url) }))
}

#[derive(Debug, Serialize)]
pub struct LatestJsonResponse {
    pub success: bool,
    pub latest_json_url: Option<String>,
    pub timestamp: Option<String>,
}

#[instrument(skip(state), fields(device_id = %request.device_id))]
pub async fn monitoring_latest_json(
    State(state): State<HostAgentState>,
    Json(request): Json<AvRequest>,
) -> Result<Json<LatestJsonResponse>, HostAgentError> {
    state.lease_cache.check(&request.device_id, &request.session_id).await?;
    let record = state.latest(&request.device_id)?;
    let json_url = format!("{}.json", record.image_url.trim_end_matches(".jpg"));
    Ok(Json(LatestJsonResponse { success: true, latest_json_url: Some(json_url), timestamp: Some(record.timestamp.to_rfc3339()) }))
}

#[derive(Debug, Deserialize)]
pub struct RecentSegmentsRequest {
    pub device_id: String,
    pub session_id: String,
    pub n: usize,
}

#[derive(Debug, Serialize)]
pub struct RecentSegmentsResponse {
    pub success: bool,
    pub segment_urls: Vec<String>,
}

/// §4.9: the last `n` `.ts` segments, merged into one scratch file when `n>1` (ffmpeg copy-mode).
/// The scratch file, if any, is removed once this response has been sent.
#[instrument(skip(state), fields(device_id = %request.device_id, n = request.n))]
pub async fn recent_segments(
    State(state): State<HostAgentState>,
    Json(request): Json<RecentSegmentsRequest>,
) -> Result<Json<RecentSegmentsResponse>, HostAgentError> {
    state.lease_cache.check(&request.device_id, &request.session_id).await?;

    let device_dir = state.device_capture_dir(&request.device_id);
    let scratch_dir = state.segment_scratch_dir(&request.device_id);

    let segments = crate::capture::recent_segments(&device_dir, request.n, &scratch_dir)
        .await
        .map_err(|e| HostAgentError::Capture(e.to_string()))?;

    let cleanup = segments.iter().any(|p| p.starts_with(&scratch_dir)).then(|| segments.clone());
    let segment_urls = segments.iter().map(|p| p.display().to_string()).collect();

    if let Some(paths) = cleanup {
        tokio::spawn(async move {
            for path in paths {
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %e, "failed to clean up merged segment scratch file");
                }
            }
        });
    }

    Ok(Json(RecentSegmentsResponse { success: true, segment_urls }))
}
