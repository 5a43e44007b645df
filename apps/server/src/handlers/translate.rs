// [apps/server/src/handlers/translate.rs]
//! `POST /server/translate/restart-batch` (§6): forwards to the AI gateway, whatever content
//! blocks were supplied.

use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use fleetmesh_domain_ai_gateway::{TranslateBatchRequest, TranslateBatchResponse};
use tracing::instrument;

#[instrument(skip(state, request), fields(host_name = %request.host_name, target_language = %request.target_language))]
pub async fn restart_batch(
    State(state): State<AppState>,
    Json(request): Json<TranslateBatchRequest>,
) -> Result<Json<TranslateBatchResponse>, ApiError> {
    let response = state
        .ai_gateway
        .translate_batch(&request)
        .await
        .map_err(|e| ApiError::transport(e.to_string()))?;
    Ok(Json(response))
}
