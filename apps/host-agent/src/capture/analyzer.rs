// [apps/host-agent/src/capture/analyzer.rs]
//! Frame Analyzer (C10): consumes keyframes from the Capture Ingestor's channel, runs the pure
//! detections in `fleetmesh-core-frame-analysis` under the adaptive sampling policy, writes an
//! atomic JSON sidecar per frame, and reports the record upstream to the server (§4.10).

use super::{QueueDepth, RawFrame};
use crate::zap::WindowHistory;
use chrono::Utc;
use fleetmesh_core_frame_analysis::{
    detect_audio, detect_blackscreen, detect_freeze, detect_macroblocks, AdaptiveSampler, AudioResult, FreezeResult,
};
use fleetmesh_domain_capture_analysis::write_sidecar_atomically;
use fleetmesh_domain_models::{CaptureFrameRecord, FrameAnalysis};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, instrument, warn};

const BLACKSCREEN_MEAN_THRESHOLD: f64 = 40.0;
const BLACKSCREEN_FRACTION_CUTOFF: f64 = 0.9;
const BLACKSCREEN_PIXEL_CUTOFF: u8 = 16;
const MACROBLOCK_THRESHOLD: f64 = 55.0;
const SILENCE_FLOOR_DB: f64 = -50.0;
const GRID_STRIDE: usize = 10;

struct AnalyzerState {
    sampler: AdaptiveSampler,
    previous_grid: Option<Vec<u8>>,
    last_freeze: Option<(u64, FreezeResult)>,
    last_audio: Option<(u64, AudioResult)>,
    blackscreen_region_top_fraction: f64,
}

impl AnalyzerState {
    fn new(blackscreen_region_top_fraction: f64) -> Self {
        Self {
            sampler: AdaptiveSampler::default(),
            previous_grid: None,
            last_freeze: None,
            last_audio: None,
            blackscreen_region_top_fraction,
        }
    }
}

/// Spawns the consumer half of the C9→C10 task pair. `on_record` is invoked for every frame so
/// the caller can push it to the server and update its own latest-frame cache.
#[instrument(skip(rx, queue_depth, history, on_record), fields(device_id))]
pub fn spawn_analyzer<F>(
    device_id: String,
    mut rx: mpsc::Receiver<RawFrame>,
    queue_depth: Arc<QueueDepth>,
    history: Arc<WindowHistory>,
    segment_dir: PathBuf,
    blackscreen_region_top_fraction: f64,
    on_record: F,
) where
    F: Fn(CaptureFrameRecord) + Send + 'static,
{
    tokio::spawn(async move {
        let mut state = AnalyzerState::new(blackscreen_region_top_fraction);

        while let Some(frame) = rx.recv().await {
            let queue_depth_now = queue_depth.depth();
            let plan = state.sampler.plan(queue_depth_now, frame.sequence);

            let analysis = analyze_frame(&frame, &plan, &mut state, &segment_dir).await;

            let image_url = frame.jpeg_path.display().to_string();
            history.push(&device_id, frame.timestamp.timestamp_millis() as f64 / 1000.0, &image_url, &analysis);

            let record = CaptureFrameRecord {
                device_id: device_id.clone(),
                sequence: frame.sequence,
                timestamp: frame.timestamp,
                image_url,
                analysis,
            };

            let sidecar_path = frame.jpeg_path.with_extension("json");
            if let Err(e) = write_sidecar_atomically(&sidecar_path, &record).await {
                error!(device_id = %device_id, sequence = frame.sequence, error = %e, "failed to write sidecar");
            }

            on_record(record);
            queue_depth.decrement();
        }
    });
}

async fn analyze_frame(
    frame: &RawFrame,
    plan: &fleetmesh_core_frame_analysis::SamplingPlan,
    state: &mut AnalyzerState,
    segment_dir: &std::path::Path,
) -> FrameAnalysis {
    let mut analysis = FrameAnalysis::default();

    let grid = match decimated_luminance_grid(&frame.jpeg_path, state.blackscreen_region_top_fraction) {
        Ok(grid) => Some(grid),
        Err(e) => {
            warn!(sequence = frame.sequence, error = %e, "could not decode keyframe for analysis");
            None
        }
    };

    if plan.run_blackscreen {
        if let Some(ref grid) = grid {
            let result = detect_blackscreen(grid, BLACKSCREEN_MEAN_THRESHOLD, BLACKSCREEN_FRACTION_CUTOFF, BLACKSCREEN_PIXEL_CUTOFF);
            analysis.blackscreen = result.is_black;
            analysis.blackscreen_pct = result.near_black_fraction * 100.0;

            let edge_density = 100.0 - result.mean_luminance.clamp(0.0, 100.0);
            let macro_result = detect_macroblocks(edge_density, MACROBLOCK_THRESHOLD);
            analysis.macroblocks = macro_result.above_threshold;
            analysis.quality_score = macro_result.quality_score;
        }
    }

    if plan.run_freeze {
        if let (Some(previous), Some(current)) = (state.previous_grid.as_ref(), grid.as_ref()) {
            let result = detect_freeze(previous, current, fleetmesh_core_frame_analysis::DEFAULT_FREEZE_THRESHOLD);
            analysis.freeze = result.is_frozen;
            analysis.freeze_diffs = vec![result.mean_abs_diff];
            state.last_freeze = Some((frame.sequence, result));
        }
    } else if let Some((carried_sequence, result)) = state.last_freeze {
        analysis.freeze = result.is_frozen;
        analysis.freeze_diffs = vec![result.mean_abs_diff];
        analysis.carried_from_sequence = Some(carried_sequence);
    }

    let should_recompute_audio = state
        .last_audio
        .map(|(seq, _)| frame.sequence.saturating_sub(seq) as usize >= plan.audio_cache_lookback)
        .unwrap_or(true);

    if should_recompute_audio {
        match measure_segment_volume(segment_dir, frame.sequence).await {
            Ok(mean_volume_db) => {
                let result = detect_audio(mean_volume_db, SILENCE_FLOOR_DB);
                state.last_audio = Some((frame.sequence, result));
            }
            Err(e) => warn!(sequence = frame.sequence, error = %e, "audio volume probe failed"),
        }
    }
    if let Some((_, audio)) = state.last_audio {
        analysis.audio = audio.has_audio;
        analysis.mean_volume_db = audio.mean_volume_db;
        analysis.volume_pct = ((audio.mean_volume_db + 60.0) / 60.0 * 100.0).clamp(0.0, 100.0);
    }

    analysis.has_incidents = analysis.blackscreen || analysis.freeze || analysis.macroblocks;

    if let Some(grid) = grid {
        state.previous_grid = Some(grid);
    }

    analysis
}

/// Decodes the keyframe and decimates the luminance of the top `region_top_fraction` of its
/// height (§4.10: "mean luminance over a configurable rectangle, default top 2/3 of frame"). The
/// rest of the frame (subtitle bars, lower-thirds) never factors into the blackscreen mean.
fn decimated_luminance_grid(jpeg_path: &std::path::Path, region_top_fraction: f64) -> Result<Vec<u8>, image::ImageError> {
    let mut luma = image::open(jpeg_path)?.to_luma8();
    let region_top_fraction = region_top_fraction.clamp(0.0, 1.0);
    let region_height = ((luma.height() as f64) * region_top_fraction).round() as u32;
    let region_height = region_height.clamp(1, luma.height());
    let region = image::imageops::crop(&mut luma, 0, 0, luma.width(), region_height).to_image();
    Ok(region.as_raw().iter().step_by(GRID_STRIDE).copied().collect())
}

/// Probes the most recent `.ts` segment's mean volume via ffmpeg's `volumedetect` filter,
/// parsing `mean_volume: <db> dB` out of its stderr.
async fn measure_segment_volume(segment_dir: &std::path::Path, sequence: u64) -> Result<f64, std::io::Error> {
    let segment_path = segment_dir.join(format!("segment_{sequence}.ts"));
    let output = tokio::process::Command::new("ffmpeg")
        .arg("-i")
        .arg(&segment_path)
        .args(["-af", "volumedetect", "-f", "null", "-"])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    stderr
        .lines()
        .find_map(|line| line.trim().strip_prefix("mean_volume: ").and_then(|rest| rest.trim_end_matches(" dB").parse().ok()))
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidData, "mean_volume not found in ffmpeg output"))
}
