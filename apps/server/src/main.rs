// [apps/server/src/main.rs]
//! Server binary entry point: loads environment, initializes tracing, ignites the kernel.

use dotenvy::dotenv;
use fleetmesh_server::prelude::{AppConfig, ServerKernel};
use fleetmesh_shared_beacon::init_tracing;
use tracing::info;

fn main() {
    dotenv().ok();
    init_tracing("fleetmesh_server");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build the tokio runtime");

    runtime.block_on(async {
        let config = AppConfig::from_env();
        info!(port = config.port, "starting ignition sequence");

        let kernel = ServerKernel::ignite(config).await;
        kernel.serve().await;
    });
}
