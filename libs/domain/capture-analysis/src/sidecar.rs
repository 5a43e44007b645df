// [libs/domain/capture-analysis/src/sidecar.rs]
//! Atomic sidecar writes (§4.10 invariant b: "the sidecar is atomic (tmp + rename)"). Shared by
//! C9 (capture folder bookkeeping) and C10 (per-frame JSON sidecars): write the full content to
//! a `.tmp` sibling, then rename into place, so a reader never observes a partially-written
//! sidecar.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("failed to serialize sidecar content: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write tmp sidecar {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("failed to rename tmp sidecar {from} into {to}: {source}")]
    Rename { from: PathBuf, to: PathBuf, source: std::io::Error },
}

fn tmp_path_for(target: &Path) -> PathBuf {
    let mut tmp = target.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Serializes `content` as pretty JSON, writes it to `target`'s `.tmp` sibling, then renames it
/// into place. The rename is the only observable mutation of `target`, so no reader ever sees a
/// half-written file.
pub async fn write_sidecar_atomically<T: Serialize>(target: &Path, content: &T) -> Result<(), SidecarError> {
    let tmp_path = tmp_path_for(target);
    let bytes = serde_json::to_vec_pretty(content)?;

    tokio::fs::write(&tmp_path, &bytes)
        .await
        .map_err(|source| SidecarError::Write { path: tmp_path.clone(), source })?;

    tokio::fs::rename(&tmp_path, target)
        .await
        .map_err(|source| SidecarError::Rename { from: tmp_path, to: target.to_path_buf(), source })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetmesh_domain_models::{CaptureFrameRecord, FrameAnalysis};
    use tempfile::tempdir;

    #[tokio::test]
    async fn write_then_rename_leaves_only_the_final_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("capture_1.json");
        let record = CaptureFrameRecord {
            device_id: "dev1".into(),
            sequence: 1,
            timestamp: chrono::Utc::now(),
            image_url: "capture_1.jpg".into(),
            analysis: FrameAnalysis::default(),
        };

        write_sidecar_atomically(&target, &record).await.unwrap();

        assert!(target.exists());
        assert!(!tmp_path_for(&target).exists());
        let read_back: CaptureFrameRecord =
            serde_json::from_slice(&tokio::fs::read(&target).await.unwrap()).unwrap();
        assert_eq!(read_back.sequence, 1);
    }

    #[tokio::test]
    async fn overwriting_an_existing_sidecar_replaces_it_atomically() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("capture_1.json");
        let mut record = CaptureFrameRecord {
            device_id: "dev1".into(),
            sequence: 1,
            timestamp: chrono::Utc::now(),
            image_url: "capture_1.jpg".into(),
            analysis: FrameAnalysis::default(),
        };
        write_sidecar_atomically(&target, &record).await.unwrap();

        record.analysis.blackscreen = true;
        write_sidecar_atomically(&target, &record).await.unwrap();

        let read_back: CaptureFrameRecord =
            serde_json::from_slice(&tokio::fs::read(&target).await.unwrap()).unwrap();
        assert!(read_back.analysis.blackscreen);
    }
}
