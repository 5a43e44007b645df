// [libs/domain/capture-analysis/src/segment_merge.rs]
//! `recentSegments` merge planning (§4.9). When `n>1`, the caller concatenates segments into a
//! temporary merged `.ts` in copy mode (no re-encode); this module only plans *which* segments
//! go into that merge and where the scratch output lands. The actual ffmpeg invocation and its
//! copy-mode-failure fallback belong to the host-agent binary, which owns the filesystem.

use std::path::{Path, PathBuf};

/// A plan for merging the last `n` segments of a device's capture folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    /// Ordered oldest-to-newest; this is also the ffmpeg concat-list order.
    pub inputs: Vec<PathBuf>,
    /// Scratch-directory destination; deleted by the caller once consumed (§4.9).
    pub output: PathBuf,
}

/// `available` is the full ordered (oldest-first) list of `.ts` segments on disk for a device.
/// Returns `None` when `n <= 1` — a single segment needs no merge, the caller serves it
/// directly — or when `available` has fewer than `n` segments.
pub fn plan_merge(available: &[PathBuf], n: usize, scratch_dir: &Path) -> Option<MergePlan> {
    if n <= 1 || available.len() < n {
        return None;
    }
    let inputs = available[available.len() - n..].to_vec();
    let output = scratch_dir.join(format!("merged_{}.ts", inputs.len()));
    Some(MergePlan { inputs, output })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn single_segment_request_needs_no_merge() {
        let available = segs(&["1.ts", "2.ts", "3.ts"]);
        assert!(plan_merge(&available, 1, Path::new("/scratch")).is_none());
    }

    #[test]
    fn plans_the_last_n_segments_in_order() {
        let available = segs(&["1.ts", "2.ts", "3.ts", "4.ts"]);
        let plan = plan_merge(&available, 3, Path::new("/scratch")).unwrap();
        assert_eq!(plan.inputs, segs(&["2.ts", "3.ts", "4.ts"]));
        assert_eq!(plan.output, PathBuf::from("/scratch/merged_3.ts"));
    }

    #[test]
    fn fewer_segments_than_requested_is_no_plan() {
        let available = segs(&["1.ts"]);
        assert!(plan_merge(&available, 3, Path::new("/scratch")).is_none());
    }
}
