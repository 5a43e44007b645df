// [apps/host-agent/src/capture/mod.rs]
//! Capture Ingestor (C9) producer and Frame Analyzer (C10) consumer, realized as a spawned task
//! pair per device communicating over a bounded `tokio::sync::mpsc` channel (§5 "Runtime
//! realization").

pub mod analyzer;
pub mod producer;

pub use analyzer::spawn_analyzer;
pub use producer::{recent_segments, spawn_producer, RawFrame};

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Observed by both sides of the channel: the producer increments on send, the analyzer
/// decrements after each frame finishes, so `depth()` reflects the queue `AdaptiveSampler.plan`
/// keys its decisions on (§4.10).
#[derive(Debug, Default)]
pub struct QueueDepth(AtomicUsize);

impl QueueDepth {
    pub fn depth(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

pub fn device_capture_dir(capture_root: &str, host_name: &str, device_id: &str) -> PathBuf {
    PathBuf::from(capture_root).join(host_name).join(device_id)
}

pub type SharedQueueDepth = Arc<QueueDepth>;
