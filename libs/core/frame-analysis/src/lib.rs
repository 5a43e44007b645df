// [libs/core/frame-analysis/src/lib.rs]
//! Per-frame detection primitives for the Frame Analyzer (C10, spec §4.10) plus the adaptive
//! sampling policy that sheds load under backpressure. Image/audio samples arrive as already
//! decoded/decimated numeric slices — decoding JPEGs and demuxing audio tracks is the host
//! agent's concern (ffmpeg invocation), not this crate's.

pub const OVERLOAD_DETECTION_INTERVAL: u64 = 10;
pub const QUEUE_DEPTH_SHED_THRESHOLD: usize = 30;
pub const DEFAULT_FREEZE_THRESHOLD: f64 = 3.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackscreenResult {
    pub is_black: bool,
    pub mean_luminance: f64,
    pub near_black_fraction: f64,
}

/// A frame is black if mean luminance over the sampled region is below `mean_threshold` AND
/// the fraction of near-black pixels is at or above `near_black_fraction_cutoff` (§4.10).
pub fn detect_blackscreen(
    luminance_samples: &[u8],
    mean_threshold: f64,
    near_black_fraction_cutoff: f64,
    near_black_pixel_cutoff: u8,
) -> BlackscreenResult {
    if luminance_samples.is_empty() {
        return BlackscreenResult {
            is_black: false,
            mean_luminance: 0.0,
            near_black_fraction: 0.0,
        };
    }
    let sum: u64 = luminance_samples.iter().map(|&p| p as u64).sum();
    let mean = sum as f64 / luminance_samples.len() as f64;
    let near_black_count = luminance_samples
        .iter()
        .filter(|&&p| p <= near_black_pixel_cutoff)
        .count();
    let near_black_fraction = near_black_count as f64 / luminance_samples.len() as f64;

    BlackscreenResult {
        is_black: mean < mean_threshold && near_black_fraction >= near_black_fraction_cutoff,
        mean_luminance: mean,
        near_black_fraction,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreezeResult {
    pub is_frozen: bool,
    pub mean_abs_diff: f64,
}

/// Per-pixel absolute difference against the previous frame, on a caller-decimated grid
/// (every 10th pixel per §4.10). `mean_abs_diff < freeze_threshold` is frozen — the comparison
/// is strict: a pair with `mean_abs_diff == freeze_threshold` is NOT frozen (§8 boundary case).
pub fn detect_freeze(previous: &[u8], current: &[u8], freeze_threshold: f64) -> FreezeResult {
    assert_eq!(
        previous.len(),
        current.len(),
        "decimated grids must be the same shape to diff"
    );
    if previous.is_empty() {
        return FreezeResult {
            is_frozen: false,
            mean_abs_diff: f64::INFINITY,
        };
    }
    let total: u64 = previous
        .iter()
        .zip(current.iter())
        .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs() as u64)
        .sum();
    let mean_abs_diff = total as f64 / previous.len() as f64;
    FreezeResult {
        is_frozen: mean_abs_diff < freeze_threshold,
        mean_abs_diff,
    }
}

/// A **freeze sequence** is present when at least one frozen comparison exists in the window
/// (§4.10, §9 glossary).
pub fn detect_freeze_sequence(diffs: &[FreezeResult]) -> bool {
    diffs.iter().any(|d| d.is_frozen)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioResult {
    pub has_audio: bool,
    pub mean_volume_db: f64,
}

/// `audio=false` if `mean_volume_db < silence_floor` (§4.10).
pub fn detect_audio(mean_volume_db: f64, silence_floor_db: f64) -> AudioResult {
    AudioResult {
        has_audio: mean_volume_db >= silence_floor_db,
        mean_volume_db,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroblockResult {
    pub above_threshold: bool,
    pub quality_score: f64,
}

/// Edge-density metric on a decoded frame; `quality_score` is clamped to `[0,100]`.
pub fn detect_macroblocks(edge_density: f64, threshold: f64) -> MacroblockResult {
    let quality_score = (100.0 - edge_density.clamp(0.0, 100.0)).clamp(0.0, 100.0);
    MacroblockResult {
        above_threshold: edge_density >= threshold,
        quality_score,
    }
}

/// What a single frame's analysis pass should do, chosen from the current queue depth
/// (§4.10 "Adaptive sampling"). Blackscreen always runs; everything else is shed under
/// overload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPlan {
    pub run_blackscreen: bool,
    pub run_freeze: bool,
    pub audio_cache_lookback: usize,
    pub allow_chunk_commit: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct AdaptiveSampler {
    overload_interval: u64,
    shed_threshold: usize,
}

impl Default for AdaptiveSampler {
    fn default() -> Self {
        Self {
            overload_interval: OVERLOAD_DETECTION_INTERVAL,
            shed_threshold: QUEUE_DEPTH_SHED_THRESHOLD,
        }
    }
}

impl AdaptiveSampler {
    /// `queue_depth` is read fresh for every frame; `sequence` drives the once-per-interval
    /// freeze cadence under overload and the once-per-5-frames chunk-append cadence.
    pub fn plan(&self, queue_depth: usize, sequence: u64) -> SamplingPlan {
        let overloaded = queue_depth > self.shed_threshold;
        SamplingPlan {
            run_blackscreen: true,
            run_freeze: if overloaded {
                sequence % self.overload_interval == 0
            } else {
                true
            },
            audio_cache_lookback: if overloaded { 1 } else { 3 },
            allow_chunk_commit: !overloaded && sequence % 5 == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blackscreen_requires_both_mean_and_fraction() {
        let dark = vec![0u8; 100];
        let result = detect_blackscreen(&dark, 40.0, 0.9, 10);
        assert!(result.is_black);

        let mixed: Vec<u8> = (0..100).map(|i| if i < 50 { 0 } else { 200 }).collect();
        let result = detect_blackscreen(&mixed, 40.0, 0.9, 10);
        assert!(!result.is_black, "mean is too high even though half the pixels are black");
    }

    #[test]
    fn freeze_threshold_is_strict_less_than() {
        let previous = vec![100u8; 4];
        let current = vec![103u8; 4]; // mean_abs_diff == 3.0
        let result = detect_freeze(&previous, &current, 3.0);
        assert!(!result.is_frozen, "diff equal to the threshold must not count as frozen");

        let current_below = vec![102u8; 4]; // mean_abs_diff == 2.0
        let result = detect_freeze(&previous, &current_below, 3.0);
        assert!(result.is_frozen);
    }

    #[test]
    fn audio_silence_floor() {
        assert!(!detect_audio(-60.0, -50.0).has_audio);
        assert!(detect_audio(-40.0, -50.0).has_audio);
    }

    /// Boundary: queue depth exactly 30 takes the full analysis path, not the shed path.
    #[test]
    fn queue_depth_30_is_not_shed() {
        let sampler = AdaptiveSampler::default();
        let plan = sampler.plan(30, 7);
        assert!(plan.run_freeze);
        assert_eq!(plan.audio_cache_lookback, 3);
    }

    /// Mirrors scenario S5 (spec §8): queue depths [10, 35, 35, 10] over sequences [1,2,3,4].
    #[test]
    fn adaptive_sampling_matches_s5() {
        let sampler = AdaptiveSampler::default();
        let depths = [10usize, 35, 35, 10];
        let plans: Vec<_> = depths
            .iter()
            .enumerate()
            .map(|(i, &d)| sampler.plan(d, (i + 1) as u64))
            .collect();

        assert!(plans.iter().all(|p| p.run_blackscreen));
        assert!(plans[0].run_freeze); // seq 1, depth 10: normal
        assert!(!plans[1].run_freeze); // seq 2, depth 35: overloaded, 2 % 10 != 0
        assert!(!plans[2].run_freeze); // seq 3, depth 35: overloaded, 3 % 10 != 0
        assert!(plans[3].run_freeze); // seq 4, depth 10: back to normal
        assert_eq!(plans[0].audio_cache_lookback, 3);
        assert_eq!(plans[1].audio_cache_lookback, 1);
        assert_eq!(plans[2].audio_cache_lookback, 1);
        assert_eq!(plans[3].audio_cache_lookback, 3);
    }
}
