// [apps/server/src/services/event_bus.rs]
//! In-process broadcast of lease transitions, cache invalidations and zap detections (§10), so
//! a future streaming consumer can subscribe without polling. The external contract in §6 does
//! not mandate streaming, so nothing here is wired to an HTTP/WS route today.

use fleetmesh_domain_models::{DeviceLease, ZapEvent};
use tokio::sync::broadcast;
use tracing::trace;

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub enum DomainEvent {
    LeaseAcquired(DeviceLease),
    LeaseReleased { host_name: String, device_id: String },
    CacheInvalidated { tree_id: String },
    ZapDetected(ZapEvent),
}

#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: DomainEvent) {
        match self.sender.send(event) {
            Ok(subscribers) => trace!(subscribers, "domain event broadcast"),
            Err(_) => trace!("domain event dropped, no subscribers"),
        }
    }
}
