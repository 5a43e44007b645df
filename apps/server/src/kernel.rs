// [apps/server/src/kernel.rs]
//! Composition root: connects the database, applies schema, builds `AppState`, spawns the
//! background daemons, and serves the HTTP router.

use crate::config::AppConfig;
use crate::routes::build_router;
use crate::services::{seed_defaults, spawn_lease_reaper, spawn_retention_daemon};
use crate::state::AppState;
use fleetmesh_infra_db::DbClient;
use std::net::{IpAddr, SocketAddr};
use tracing::{error, info, instrument};

pub struct ServerKernel {
    port: u16,
    state: AppState,
}

impl ServerKernel {
    #[instrument(skip(config))]
    pub async fn ignite(config: AppConfig) -> Self {
        let db = DbClient::connect(&config.database_url, config.database_auth_token.clone())
            .await
            .expect("database connection failed during ignition");

        let port = config.port;
        let state = AppState::new(config, db);
        seed_defaults(&state).await;
        Self { port, state }
    }

    pub async fn serve(self) {
        spawn_lease_reaper(self.state.clone()).await;
        spawn_retention_daemon(self.state.clone()).await;

        let router = build_router(self.state);
        let address = SocketAddr::new("0.0.0.0".parse::<IpAddr>().unwrap(), self.port);

        info!(%address, "server listening");
        let listener = tokio::net::TcpListener::bind(address)
            .await
            .expect("failed to bind listening port");

        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "server runtime failure");
            std::process::exit(1);
        }
    }
}
