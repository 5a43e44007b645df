// [apps/host-agent/src/capture/producer.rs]
//! Capture Ingestor (C9): a continuous per-device producer that shells out to `ffmpeg` to write
//! HLS segments and JPEG keyframes into the capture filesystem layout (§6), then hands each new
//! keyframe to the Frame Analyzer over a bounded channel.

use super::QueueDepth;
use chrono::Utc;
use fleetmesh_domain_capture_analysis::{plan_merge, MergePlan};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("ffmpeg could not be started: {0}")]
    FfmpegUnavailable(std::io::Error),
    #[error("filesystem error in capture folder: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct RawFrame {
    pub sequence: u64,
    pub timestamp: chrono::DateTime<Utc>,
    pub jpeg_path: PathBuf,
}

/// Spawns the ffmpeg segmenter and a polling loop that notices each new keyframe and forwards it
/// downstream. Returns once the device's capture directory has been created; the producer itself
/// runs for the lifetime of the process.
#[instrument(skip(tx, queue_depth), fields(device_id))]
pub async fn spawn_producer(
    device_id: String,
    capture_dir: PathBuf,
    source_uri: String,
    fps: u32,
    tx: mpsc::Sender<RawFrame>,
    queue_depth: Arc<QueueDepth>,
) -> Result<(), CaptureError> {
    tokio::fs::create_dir_all(&capture_dir).await?;

    let mut ffmpeg = tokio::process::Command::new("ffmpeg")
        .args([
            "-y",
            "-i",
            &source_uri,
            "-f",
            "segment",
            "-segment_time",
            "1",
            "-reset_timestamps",
            "1",
            "segment_%d.ts",
            "-vf",
            &format!("fps={fps}"),
            "-f",
            "image2",
            "capture_%d.jpg",
        ])
        .current_dir(&capture_dir)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(CaptureError::FfmpegUnavailable)?;

    info!(device_id = %device_id, dir = %capture_dir.display(), "capture producer started");

    tokio::spawn(async move {
        let mut sequence: u64 = 0;
        let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / fps.max(1) as f64));

        loop {
            interval.tick().await;

            if let Ok(Some(status)) = ffmpeg.try_wait() {
                warn!(device_id = %device_id, %status, "ffmpeg exited, stopping producer");
                break;
            }

            sequence += 1;
            let jpeg_path = capture_dir.join(format!("capture_{sequence}.jpg"));
            if !jpeg_path.exists() {
                continue;
            }

            let frame = RawFrame { sequence, timestamp: Utc::now(), jpeg_path };
            queue_depth.increment();
            if tx.send(frame).await.is_err() {
                warn!(device_id = %device_id, "analyzer channel closed, stopping producer");
                break;
            }
        }

        if let Err(e) = ffmpeg.kill().await {
            error!(device_id = %device_id, error = %e, "failed to terminate ffmpeg on shutdown");
        }
    });

    Ok(())
}

/// Returns the last `n` segments for a device, concatenated into a scratch `.ts` when `n>1`
/// (ffmpeg copy-mode, no re-encode); falls back to per-segment paths if the merge fails (§4.9).
#[instrument]
pub async fn recent_segments(device_dir: &Path, n: usize, scratch_dir: &Path) -> Result<Vec<PathBuf>, CaptureError> {
    let mut entries = tokio::fs::read_dir(device_dir).await?;
    let mut segments = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("ts") {
            segments.push(path);
        }
    }
    segments.sort();

    let plan = match plan_merge(&segments, n, scratch_dir) {
        Some(plan) => plan,
        None => return Ok(segments.into_iter().rev().take(n).collect()),
    };

    match merge_segments(&plan, scratch_dir).await {
        Ok(merged) => Ok(vec![merged]),
        Err(e) => {
            warn!(error = %e, "segment merge failed, falling back to per-segment processing");
            Ok(plan.inputs)
        }
    }
}

async fn merge_segments(plan: &MergePlan, scratch_dir: &Path) -> Result<PathBuf, CaptureError> {
    tokio::fs::create_dir_all(scratch_dir).await?;
    let list_path = scratch_dir.join(format!("{}.concat", plan.output.display().to_string().replace(['/', '\\'], "_")));
    let list_contents = plan
        .inputs
        .iter()
        .map(|p| format!("file '{}'", p.display()))
        .collect::<Vec<_>>()
        .join("\n");
    tokio::fs::write(&list_path, list_contents).await?;

    let status = tokio::process::Command::new("ffmpeg")
        .args(["-y", "-f", "concat", "-safe", "0", "-i"])
        .arg(&list_path)
        .args(["-c", "copy"])
        .arg(&plan.output)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .status()
        .await
        .map_err(CaptureError::FfmpegUnavailable)?;

    let _ = tokio::fs::remove_file(&list_path).await;

    if !status.success() {
        return Err(CaptureError::Io(std::io::Error::new(std::io::ErrorKind::Other, "ffmpeg concat failed")));
    }
    Ok(plan.output.clone())
}
