// [apps/server/src/handlers/av.rs]
//! Capture Ingestor (C9) HTTP surface: `POST /server/av/takeScreenshot`,
//! `POST /server/av/monitoring/latest-json`, `POST /server/av/recentSegments` (§6).

use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct AvRequest {
    pub host: String,
    pub device_id: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct TakeScreenshotResponse {
    pub success: bool,
    pub screenshot_url: Option<String>,
}

#[instrument(skip(state), fields(host = %request.host, device_id = %request.device_id))]
pub async fn take_screenshot(
    State(state): State<AppState>,
    Json(request): Json<AvRequest>,
) -> Result<Json<TakeScreenshotResponse>, ApiError> {
    state.verify_lease_holder(&request.host, &request.device_id, &request.session_id).await?;

    let client = state.host_client(&request.host).map_err(ApiError::transport)?;
    let response = client.take_screenshot(&request.device_id, &request.session_id).await?;

    Ok(Json(TakeScreenshotResponse { success: response.success, screenshot_url: response.screenshot_url }))
}

#[derive(Debug, Serialize)]
pub struct LatestJsonResponse {
    pub success: bool,
    pub latest_json_url: Option<String>,
    pub timestamp: Option<String>,
}

#[instrument(skip(state), fields(host = %request.host, device_id = %request.device_id))]
pub async fn monitoring_latest_json(
    State(state): State<AppState>,
    Json(request): Json<AvRequest>,
) -> Result<Json<LatestJsonResponse>, ApiError> {
    state.verify_lease_holder(&request.host, &request.device_id, &request.session_id).await?;

    let client = state.host_client(&request.host).map_err(ApiError::transport)?;
    let response = client.get_latest_json(&request.device_id, &request.session_id).await?;

    Ok(Json(LatestJsonResponse {
        success: response.success,
        latest_json_url: response.latest_json_url,
        timestamp: response.timestamp,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecentSegmentsRequest {
    pub host: String,
    pub device_id: String,
    pub session_id: String,
    pub n: usize,
}

#[derive(Debug, Serialize)]
pub struct RecentSegmentsResponse {
    pub success: bool,
    pub segment_urls: Vec<String>,
}

#[instrument(skip(state), fields(host = %request.host, device_id = %request.device_id, n = request.n))]
pub async fn recent_segments(
    State(state): State<AppState>,
    Json(request): Json<RecentSegmentsRequest>,
) -> Result<Json<RecentSegmentsResponse>, ApiError> {
    state.verify_lease_holder(&request.host, &request.device_id, &request.session_id).await?;

    let client = state.host_client(&request.host).map_err(ApiError::transport)?;
    let response = client.recent_segments(&request.device_id, &request.session_id, request.n).await?;

    Ok(Json(RecentSegmentsResponse { success: response.success, segment_urls: response.segment_urls }))
}
