// [apps/server/src/routes.rs]
//! HTTP routing (§6 "stable paths"). Authentication/tenancy is an explicit Non-goal, so there is
//! no guard layer here beyond CORS and request tracing — every route is reachable by any caller
//! that can open a TCP connection to the process.

use crate::handlers::{action, av, capture, control, lease_lookup, navigation, remote, translate, verification, zap};
use crate::state::AppState;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let control_routes = Router::new()
        .route("/takeControl", post(control::take_control))
        .route("/releaseControl", post(control::release_control));

    let navigation_tree_routes = Router::new()
        .route("/getTreeByUserInterfaceId/:ui_id", get(navigation::get_tree_by_userinterface_id))
        .route("/saveTree", post(navigation::save_tree));

    let navigation_cache_routes = Router::new().route("/update-node", post(navigation::update_node));

    let av_routes = Router::new()
        .route("/takeScreenshot", post(av::take_screenshot))
        .route("/monitoring/latest-json", post(av::monitoring_latest_json))
        .route("/recentSegments", post(av::recent_segments));

    let server_routes = Router::new()
        .nest("/control", control_routes)
        .route("/remote/executeCommand", post(remote::execute_command))
        .route("/action/executeBatch", post(action::execute_batch))
        .route("/verification/execute", post(verification::execute_verification))
        .nest("/navigationTrees", navigation_tree_routes)
        .nest("/navigation/cache", navigation_cache_routes)
        .nest("/av", av_routes)
        .route("/translate/restart-batch", post(translate::restart_batch))
        .route("/capture/record", post(capture::record_frame))
        .route("/zap/reset", post(zap::reset_zap))
        .route("/zap/observe", post(zap::observe_zap))
        .route("/internal/lease/:host_name/:device_id", get(lease_lookup::get_lease));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/server", server_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
