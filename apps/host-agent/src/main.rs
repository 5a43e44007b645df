// [apps/host-agent/src/main.rs]
//! Host-agent binary entry point: loads environment, initializes tracing, starts a capture
//! pipeline per configured device, and serves the host-agent RPC surface (§6).

use clap::Parser;
use dotenvy::dotenv;
use fleetmesh_host_agent_lib::capture::{spawn_analyzer, spawn_producer, QueueDepth};
use fleetmesh_host_agent_lib::prelude::{HostAgentConfig, HostAgentState};
use fleetmesh_host_agent_lib::routes::build_router;
use fleetmesh_shared_beacon::init_tracing;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

const CAPTURE_CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing("fleetmesh_host_agent");

    let config = HostAgentConfig::parse();
    info!(host_name = %config.host_name, port = config.port, "starting host-agent ignition sequence");

    let state = HostAgentState::new(config.clone());

    for (device_id, source_uri) in config.device_sources() {
        let capture_dir = state.device_capture_dir(&device_id);
        let (tx, rx) = mpsc::channel(CAPTURE_CHANNEL_CAPACITY);
        let queue_depth = Arc::new(QueueDepth::default());

        if let Err(e) = spawn_producer(device_id.clone(), capture_dir.clone(), source_uri, config.capture_fps, tx, queue_depth.clone()).await {
            error!(device_id = %device_id, error = %e, "capture producer failed to start, skipping device");
            continue;
        }

        let analyzer_state = state.clone();
        spawn_analyzer(
            device_id.clone(),
            rx,
            queue_depth,
            state.window_history.clone(),
            capture_dir,
            config.blackscreen_region_top_fraction,
            move |record| {
                analyzer_state.record_latest(record);
            },
        );

        info!(device_id = %device_id, "capture pipeline online");
    }

    let router = build_router(state);
    let address = SocketAddr::new("0.0.0.0".parse::<IpAddr>().unwrap(), config.port);
    info!(%address, "host-agent listening");

    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
