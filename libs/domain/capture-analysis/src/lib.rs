// [libs/domain/capture-analysis/src/lib.rs]
//! Capture Ingestor domain logic (C9, spec §4.9): segment-merge planning for `recentSegments`,
//! the retention pruning policy over `CaptureFrameRecord`s, and the tmp+rename sidecar write
//! helper shared with the Frame Analyzer (C10, §4.10 invariant b).

pub mod retention;
pub mod segment_merge;
pub mod sidecar;

pub use retention::{prune_candidates, RetentionPolicy};
pub use segment_merge::{plan_merge, MergePlan};
pub use sidecar::{write_sidecar_atomically, SidecarError};
