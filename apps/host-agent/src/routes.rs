// [apps/host-agent/src/routes.rs]
//! Host-agent RPC surface (§6, "consumed by C8, one process per host").

use crate::handlers::{action, av, verification, zap};
use crate::state::HostAgentState;
use axum::routing::post;
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn build_router(state: HostAgentState) -> Router {
    Router::new()
        .route("/host/executeAction", post(action::execute_action))
        .route("/host/executeBatch", post(action::execute_batch))
        .route("/host/executeVerification", post(verification::execute_verification))
        .route("/host/takeScreenshot", post(av::take_screenshot))
        .route("/host/getLatestJson", post(av::monitoring_latest_json))
        .route("/host/recentSegments", post(av::recent_segments))
        .route("/host/zap/reset", post(zap::reset_zap))
        .route("/host/zap/observe", post(zap::observe_zap))
        .route("/health", axum::routing::get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
