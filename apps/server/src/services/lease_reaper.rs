// [apps/server/src/services/lease_reaper.rs]
//! Periodic sweep that reaps leases past their `expires_at` (§4.7: "absence of heartbeat past a
//! grace window invalidates the lease"). A `tokio::time::interval` daemon, mirroring the
//! teacher's heartbeat-guard/reaper shape (§10).

use crate::state::AppState;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, instrument};

const SWEEP_INTERVAL_SECS: u64 = 15;

#[instrument(skip(state))]
pub async fn spawn_lease_reaper(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match state.leases.reap_expired().await {
                Ok(count) if count > 0 => info!(count, "lease reaper reclaimed expired leases"),
                Ok(_) => {}
                Err(e) => error!(error = %e, "lease reaper sweep failed"),
            }
        }
    });
}
