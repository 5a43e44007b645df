// [apps/server/src/handlers/lease_lookup.rs]
//! Internal endpoint, not part of the stable `/server/...` surface (§6): a host-agent's
//! defense-in-depth session check (§6 "Host-agent RPC surface") needs some way to learn who
//! currently holds a device's lease without talking to the database directly. This exposes
//! just enough of C7 for that local cache to refresh itself.

use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Serialize)]
pub struct LeaseLookupResponse {
    pub session_id: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[instrument(skip(state))]
pub async fn get_lease(
    State(state): State<AppState>,
    Path((host_name, device_id)): Path<(String, String)>,
) -> Result<Json<LeaseLookupResponse>, ApiError> {
    let lease = state.leases.get(&host_name, &device_id).await?;
    Ok(Json(LeaseLookupResponse { session_id: lease.session_id, expires_at: lease.expires_at }))
}
