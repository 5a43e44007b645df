// [apps/server/src/handlers/navigation.rs]
//! Navigation Graph Store (C3) and Navigation Cache (C4) HTTP surface (§6):
//! `getTreeByUserInterfaceId`, `saveTree`, `cache/update-node`.

use crate::errors::ApiError;
use crate::services::event_bus::DomainEvent;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use fleetmesh_domain_models::{NavigationNode, NavigationTree};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Serialize)]
pub struct GetTreeResponse {
    pub success: bool,
    pub tree: NavigationTree,
}

#[instrument(skip(state))]
pub async fn get_tree_by_userinterface_id(
    State(state): State<AppState>,
    Path(userinterface_id): Path<String>,
) -> Result<Json<GetTreeResponse>, ApiError> {
    let tree_id = state.navigation.find_tree_id_by_userinterface(&userinterface_id).await?;
    let tree = state
        .cache
        .get_or_load(&tree_id, state.navigation.as_ref())
        .await
        .map_err(|e| ApiError::semantic(e.to_string()))?;

    Ok(Json(GetTreeResponse { success: true, tree }))
}

#[derive(Debug, Deserialize)]
pub struct SaveTreeRequest {
    pub name: String,
    pub userinterface_id: String,
    pub tree_data: NavigationTree,
    pub modification_type: String,
    pub changes_summary: String,
}

#[derive(Debug, Serialize)]
pub struct SaveTreeResponse {
    pub success: bool,
}

/// Persists the whole tree (C3), then invalidates the cache entry atomically with the write
/// (§4.3 invalidation path a).
#[instrument(skip(state, request), fields(tree_id = %request.tree_data.tree_id, modification_type = %request.modification_type))]
pub async fn save_tree(
    State(state): State<AppState>,
    Json(request): Json<SaveTreeRequest>,
) -> Result<Json<SaveTreeResponse>, ApiError> {
    tracing::info!(changes_summary = %request.changes_summary, "saving navigation tree");

    let mut tree = request.tree_data;
    tree.name = request.name;
    tree.userinterface_id = request.userinterface_id;

    state.navigation.create_tree(&tree).await?;
    state.cache.invalidate(&tree.tree_id).await;
    state.event_bus.publish(DomainEvent::CacheInvalidated { tree_id: tree.tree_id });

    Ok(Json(SaveTreeResponse { success: true }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateNodeRequest {
    pub tree_id: String,
    pub node: NavigationNode,
}

#[derive(Debug, Serialize)]
pub struct UpdateNodeResponse {
    pub success: bool,
}

/// Invalidation path (b): an incremental cache patch of just this node, no full rebuild (§4.4).
#[instrument(skip(state, request), fields(tree_id = %request.tree_id, node_id = %request.node.node_id))]
pub async fn update_node(
    State(state): State<AppState>,
    Json(request): Json<UpdateNodeRequest>,
) -> Result<Json<UpdateNodeResponse>, ApiError> {
    state
        .cache
        .update_node(&request.tree_id, request.node)
        .await
        .map_err(|e| ApiError::semantic(e.to_string()))?;

    Ok(Json(UpdateNodeResponse { success: true }))
}
