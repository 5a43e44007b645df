//! [libs/domain/models/src/capture.rs]
//! Capture & Frame Analyzer entities (C9/C10, §3, §4.10).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// The detections carried in a per-frame JSON sidecar (§4.10).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FrameAnalysis {
    pub blackscreen: bool,
    pub blackscreen_pct: f64,
    pub freeze: bool,
    pub freeze_diffs: Vec<f64>,
    pub audio: bool,
    pub volume_pct: f64,
    pub mean_volume_db: f64,
    pub macroblocks: bool,
    pub quality_score: f64,
    pub has_incidents: bool,
    pub last_3_filenames: Vec<String>,
    /// When a detection was skipped under backpressure, names the sequence it was carried
    /// from instead of silently omitting the field (§4.10 invariant a).
    #[serde(default)]
    pub carried_from_sequence: Option<u64>,
}

/// `{ device_id, sequence, timestamp, image_url, analysis }`, written as a JSON sidecar next
/// to each JPEG (§3).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureFrameRecord {
    pub device_id: String,
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub image_url: String,
    pub analysis: FrameAnalysis,
}
