// [apps/host-agent/src/zap.rs]
//! Zap Detector (C11) invocation: bridges the per-device frame history C10 maintains to
//! `fleetmesh-core-zap-engine`'s pure state machine, and issues the banner-extraction AI call
//! when a candidate frame fires (§4.11).

use fleetmesh_core_zap_engine::{WindowFrame, ZapDetector, ZAP_WINDOW_SIZE};
use fleetmesh_domain_ai_gateway::AiGateway;
use fleetmesh_domain_models::{ChannelInfo, FrameAnalysis, ZapEvent};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::Arc;
use tracing::{instrument, warn};

const HISTORY_CAPACITY: usize = ZAP_WINDOW_SIZE * 2;

/// A cheap banner-presence heuristic: a macroblock-quality dip paired with non-freeze content is
/// treated as banner-candidate, gating the (expensive) AI call (§4.11 "Banner analysis").
fn is_banner_candidate(analysis: &FrameAnalysis) -> bool {
    !analysis.freeze && !analysis.blackscreen && analysis.quality_score < 80.0
}

/// Rolling per-device window of recent frame analyses, written by C10 and read by C11 (§5: "C11
/// runs on demand, sharing C10's most recent sidecars").
#[derive(Default)]
pub struct WindowHistory {
    devices: Mutex<HashMap<String, VecDeque<WindowFrame>>>,
}

impl WindowHistory {
    pub fn push(&self, device_id: &str, timestamp_s: f64, image_url: &str, analysis: &FrameAnalysis) {
        let mut devices = self.devices.lock().unwrap();
        let history = devices.entry(device_id.to_string()).or_default();
        history.push_back(WindowFrame {
            timestamp_s,
            blackscreen: analysis.blackscreen,
            freeze: analysis.freeze,
            banner_candidate: is_banner_candidate(analysis),
            image_url: image_url.to_string(),
        });
        while history.len() > HISTORY_CAPACITY {
            history.pop_front();
        }
    }

    /// Every frame at or after `key_release_ts`, truncated to the zap window size.
    fn window_since(&self, device_id: &str, key_release_ts: f64) -> Vec<WindowFrame> {
        let devices = self.devices.lock().unwrap();
        devices
            .get(device_id)
            .map(|history| {
                history
                    .iter()
                    .filter(|f| f.timestamp_s >= key_release_ts)
                    .take(ZAP_WINDOW_SIZE)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Per-run zap detectors, one per device, scoped to the lifetime of a script run (§4.11:
/// "learned_method, once set, is used exclusively for ... that run"). The script executor (C12)
/// resets a device's entry via [`ZapRunRegistry::reset`] at `setup`.
#[derive(Default)]
pub struct ZapRunRegistry {
    detectors: Mutex<HashMap<String, ZapDetector>>,
}

impl ZapRunRegistry {
    pub fn reset(&self, device_id: &str) {
        self.detectors.lock().unwrap().insert(device_id.to_string(), ZapDetector::new());
    }

    #[instrument(skip(self, history, ai_gateway), fields(device_id))]
    pub async fn observe(
        &self,
        device_id: &str,
        action_command: &str,
        key_release_ts: f64,
        history: &WindowHistory,
        ai_gateway: &dyn AiGateway,
    ) -> ZapEvent {
        let window = history.window_since(device_id, key_release_ts);

        let outcome = {
            let mut detectors = self.detectors.lock().unwrap();
            let detector = detectors.entry(device_id.to_string()).or_default();
            detector.observe(key_release_ts, &window)
        };

        let channel_info = match outcome
            .banner_candidate_indices
            .first()
            .and_then(|&first_candidate| window.get(first_candidate))
        {
            Some(candidate_frame) => match ai_gateway.extract_channel_info(&candidate_frame.image_url).await {
                Ok(info) => Some(info),
                Err(e) => {
                    warn!(device_id = %device_id, error = %e, "banner extraction call failed");
                    None
                }
            },
            None => None::<ChannelInfo>,
        };

        ZapEvent {
            device_id: device_id.to_string(),
            action_command: action_command.to_string(),
            key_release_ts,
            detected: outcome.detected,
            method: outcome.method,
            duration_s: outcome.duration_s,
            channel_info,
        }
    }
}

pub type SharedWindowHistory = Arc<WindowHistory>;
pub type SharedZapRegistry = Arc<ZapRunRegistry>;
