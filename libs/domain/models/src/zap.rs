//! [libs/domain/models/src/zap.rs]
//! Zap Detector entities (C11, §3, §4.11).

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ZapMethod {
    Blackscreen,
    Freeze,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub channel_name: String,
    pub program_name: String,
    pub start_time: String,
    pub end_time: String,
}

/// `{ device_id, action_command, key_release_ts, detected, method?, duration_s, channel_info? }`
/// (§3).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZapEvent {
    pub device_id: String,
    pub action_command: String,
    pub key_release_ts: f64,
    pub detected: bool,
    #[serde(default)]
    pub method: Option<ZapMethod>,
    pub duration_s: f64,
    #[serde(default)]
    pub channel_info: Option<ChannelInfo>,
}

/// Per-run accumulator (§4.11 "Statistics per run").
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ZapRunStats {
    pub iterations: u64,
    pub motion_detected_count: u64,
    pub subtitle_detected_count: u64,
    pub audio_speech_detected_count: u64,
    pub zap_detected_count: u64,
    pub durations: Vec<f64>,
    pub detected_languages: Vec<String>,
    pub detected_channels: Vec<String>,
    pub learned_method: Option<ZapMethod>,
}
