// [apps/host-agent/src/lease_cache.rs]
//! Defense-in-depth session check (§6: "the host agent rejects any request whose session does
//! not match its locally cached notion of the current lease holder"). The authoritative lease
//! lives in C7 on the server; this is a short-TTL read-through cache over the server's internal
//! lease-lookup endpoint, not a second source of truth.

use crate::errors::HostAgentError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::instrument;

#[derive(Debug, Clone)]
struct CachedLease {
    session_id: String,
    fetched_at: Instant,
}

pub struct LeaseCache {
    http: reqwest::Client,
    server_url: String,
    host_name: String,
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedLease>>,
}

impl LeaseCache {
    pub fn new(http: reqwest::Client, server_url: String, host_name: String, ttl: Duration) -> Self {
        Self { http, server_url, host_name, ttl, entries: Mutex::new(HashMap::new()) }
    }

    /// Refreshes the cached holder for `device_id` if stale, then checks `presented` against it.
    #[instrument(skip(self), fields(device_id, host_name = %self.host_name))]
    pub async fn check(&self, device_id: &str, presented: &str) -> Result<(), HostAgentError> {
        let needs_refresh = {
            let entries = self.entries.lock().unwrap();
            match entries.get(device_id) {
                Some(cached) => cached.fetched_at.elapsed() > self.ttl,
                None => true,
            }
        };

        if needs_refresh {
            self.refresh(device_id).await?;
        }

        let entries = self.entries.lock().unwrap();
        match entries.get(device_id) {
            Some(cached) if cached.session_id == presented => Ok(()),
            _ => Err(HostAgentError::SessionMismatch { presented: presented.to_string() }),
        }
    }

    async fn refresh(&self, device_id: &str) -> Result<(), HostAgentError> {
        let url = format!("{}/server/internal/lease/{}/{}", self.server_url, self.host_name, device_id);
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            // No active lease: clear any stale entry so a subsequent check fails closed.
            self.entries.lock().unwrap().remove(device_id);
            return Ok(());
        }

        #[derive(serde::Deserialize)]
        struct LookupResponse {
            session_id: String,
        }
        let body: LookupResponse = response.json().await?;
        self.entries
            .lock()
            .unwrap()
            .insert(device_id.to_string(), CachedLease { session_id: body.session_id, fetched_at: Instant::now() });
        Ok(())
    }
}
