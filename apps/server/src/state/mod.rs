// [apps/server/src/state/mod.rs]
//! Composition root. One `AppState` per process, cloned cheaply into every handler (every
//! field is an `Arc` or already `Clone`).

use crate::config::AppConfig;
use crate::services::event_bus::EventBus;
use fleetmesh_domain_ai_gateway::{AiGateway, HttpAiGateway};
use fleetmesh_domain_navigation::NavigationCache;
use fleetmesh_infra_db::{
    CaptureRepository, CommandRepository, DbClient, LeaseRepository, NavigationRepository, ReferenceRepository,
    ZapEventRepository,
};
use fleetmesh_infra_host_client::HostProxyClient;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbClient,
    pub references: Arc<ReferenceRepository>,
    pub commands: Arc<CommandRepository>,
    pub navigation: Arc<NavigationRepository>,
    pub leases: Arc<LeaseRepository>,
    pub captures: Arc<CaptureRepository>,
    pub zap_events: Arc<ZapEventRepository>,
    pub cache: Arc<NavigationCache>,
    pub event_bus: Arc<EventBus>,
    pub ai_gateway: Arc<dyn AiGateway>,
    /// One client per registered host (§4.8), built once at startup from `HOST_REGISTRY`.
    pub host_clients: Arc<HashMap<String, HostProxyClient>>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbClient) -> Self {
        let http = reqwest::Client::new();

        let host_clients = config
            .host_registry
            .iter()
            .map(|(host_name, base_url)| {
                let client = HostProxyClient::new(http.clone(), base_url.clone())
                    .with_retries(config.transport_retries);
                (host_name.clone(), client)
            })
            .collect::<HashMap<_, _>>();
        info!(hosts = host_clients.len(), "host proxy clients constructed");

        Self {
            references: Arc::new(ReferenceRepository::new(db.clone())),
            commands: Arc::new(CommandRepository::new(db.clone())),
            navigation: Arc::new(NavigationRepository::new(db.clone())),
            leases: Arc::new(LeaseRepository::new(db.clone())),
            captures: Arc::new(CaptureRepository::new(db.clone())),
            zap_events: Arc::new(ZapEventRepository::new(db.clone())),
            cache: Arc::new(NavigationCache::new()),
            event_bus: Arc::new(EventBus::new()),
            ai_gateway: Arc::new(HttpAiGateway::new(http, config.ai_service_base_url.clone())),
            host_clients: Arc::new(host_clients),
            config: Arc::new(config),
            db,
        }
    }

    /// Looks up the proxy client for `host_name`, or a Transport-category error if the host was
    /// never registered (§7).
    pub fn host_client(&self, host_name: &str) -> Result<&HostProxyClient, String> {
        self.host_clients
            .get(host_name)
            .ok_or_else(|| format!("host '{host_name}' is not in the host registry"))
    }

    /// The Host Proxy (C8) enforces that the caller holds the device's lease before forwarding
    /// any RPC (§4.8). The authoritative lease lives here on the server; the host-agent's own
    /// session check (§6) is defense-in-depth on top of this.
    pub async fn verify_lease_holder(
        &self,
        host_name: &str,
        device_id: &str,
        session_id: &str,
    ) -> Result<(), fleetmesh_infra_db::DbError> {
        let lease = self.leases.get(host_name, device_id).await?;
        if lease.session_id != session_id {
            return Err(fleetmesh_infra_db::DbError::LeaseNotFound {
                host_name: host_name.to_string(),
                device_id: device_id.to_string(),
            });
        }
        Ok(())
    }
}
