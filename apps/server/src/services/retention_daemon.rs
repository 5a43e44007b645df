// [apps/server/src/services/retention_daemon.rs]
//! Periodic sweep that prunes capture frame records past the retention policy (§4.9), delegating
//! the actual keep/drop decision to the pure `prune_candidates` function.

use crate::state::AppState;
use fleetmesh_domain_capture_analysis::{prune_candidates, RetentionPolicy};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, instrument};

const SWEEP_INTERVAL_SECS: u64 = 300;

#[instrument(skip(state))]
pub async fn spawn_retention_daemon(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let policy = RetentionPolicy::default();

        loop {
            ticker.tick().await;
            let all = match state.captures.list_all().await {
                Ok(rows) => rows,
                Err(e) => {
                    error!(error = %e, "retention sweep could not list capture frame records");
                    continue;
                }
            };

            let now = chrono::Utc::now();
            let mut by_host: std::collections::HashMap<&str, Vec<_>> = std::collections::HashMap::new();
            for (host_name, record) in &all {
                by_host.entry(host_name.as_str()).or_default().push(record);
            }

            let mut pruned = 0u64;
            for (host_name, records) in &by_host {
                let owned: Vec<_> = records.iter().map(|r| (*r).clone()).collect();
                for record in prune_candidates(&owned, &policy, now) {
                    if let Err(e) = state.captures.delete(host_name, &record.device_id, record.sequence).await {
                        error!(error = %e, host_name, device_id = %record.device_id, "failed to prune capture frame record");
                    } else {
                        pruned += 1;
                    }
                }
            }
            if pruned > 0 {
                info!(pruned, "retention daemon pruned capture frame records");
            }
        }
    });
}
