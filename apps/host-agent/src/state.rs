// [apps/host-agent/src/state.rs]
//! Composition root for the host-agent process: one per host, shared by the RPC handlers and
//! the per-device capture pipelines.

use crate::capture::device_capture_dir;
use crate::config::HostAgentConfig;
use crate::driver::DriverRegistry;
use crate::errors::HostAgentError;
use crate::lease_cache::LeaseCache;
use crate::zap::{SharedWindowHistory, SharedZapRegistry, WindowHistory, ZapRunRegistry};
use fleetmesh_domain_ai_gateway::{AiGateway, HttpAiGateway};
use fleetmesh_domain_models::CaptureFrameRecord;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

#[derive(Clone)]
pub struct HostAgentState {
    pub config: Arc<HostAgentConfig>,
    pub drivers: Arc<DriverRegistry>,
    pub lease_cache: Arc<LeaseCache>,
    pub ai_gateway: Arc<dyn AiGateway>,
    pub window_history: SharedWindowHistory,
    pub zap_registry: SharedZapRegistry,
    latest_frames: Arc<Mutex<HashMap<String, CaptureFrameRecord>>>,
    http: reqwest::Client,
}

impl HostAgentState {
    pub fn new(config: HostAgentConfig) -> Self {
        let http = reqwest::Client::new();
        let device_kinds = config.device_drivers();

        Self {
            drivers: Arc::new(DriverRegistry::new(http.clone(), device_kinds)),
            lease_cache: Arc::new(LeaseCache::new(
                http.clone(),
                config.server_url.clone(),
                config.host_name.clone(),
                Duration::from_secs(config.lease_cache_ttl_secs),
            )),
            ai_gateway: Arc::new(HttpAiGateway::new(http.clone(), config.ai_service_url.clone())),
            window_history: Arc::new(WindowHistory::default()),
            zap_registry: Arc::new(ZapRunRegistry::default()),
            latest_frames: Arc::new(Mutex::new(HashMap::new())),
            http,
            config: Arc::new(config),
        }
    }

    pub fn device_capture_dir(&self, device_id: &str) -> std::path::PathBuf {
        device_capture_dir(&self.config.capture_root, &self.config.host_name, device_id)
    }

    /// Scratch directory for merged `recentSegments` output (§4.9); never holds anything a
    /// capture producer or analyzer reads back, so the caller is free to delete its contents.
    pub fn segment_scratch_dir(&self, device_id: &str) -> std::path::PathBuf {
        self.device_capture_dir(device_id).join("scratch")
    }

    pub fn record_latest(&self, record: CaptureFrameRecord) {
        self.latest_frames.lock().unwrap().insert(record.device_id.clone(), record.clone());
        self.push_to_server(record);
    }

    pub fn latest(&self, device_id: &str) -> Result<CaptureFrameRecord, HostAgentError> {
        self.latest_frames.lock().unwrap().get(device_id).cloned().ok_or(HostAgentError::NoCaptureFrame)
    }

    /// Fire-and-forget push to the server's internal ingestion endpoint (§10: "ambient
    /// plumbing", not part of the stable surface). A failed push never blocks analysis.
    fn push_to_server(&self, record: CaptureFrameRecord) {
        let http = self.http.clone();
        let url = format!("{}/server/capture/record", self.config.server_url);
        let host_name = self.config.host_name.clone();

        tokio::spawn(async move {
            #[derive(serde::Serialize)]
            struct Payload {
                host_name: String,
                #[serde(flatten)]
                record: CaptureFrameRecord,
            }
            if let Err(e) = http.post(&url).json(&Payload { host_name, record }).send().await {
                warn!(error = %e, "failed to report capture frame to server");
            }
        });
    }
}
