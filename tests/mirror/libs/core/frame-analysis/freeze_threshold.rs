//! External integration test wired via `[[test]] name = "frame_analysis_freeze_threshold"`,
//! mirroring `libs/core/frame-analysis` (§4.10 freeze-threshold strictness invariant).

use fleetmesh_core_frame_analysis::detect_freeze;
use proptest::prelude::*;

proptest! {
    /// `is_frozen` must track a strict `<` comparison against `freeze_threshold`, never `<=`: a
    /// diff exactly at the threshold is content that changed by precisely the cutoff amount, not
    /// a freeze (§4.10).
    #[test]
    fn is_frozen_matches_strict_less_than(grid in proptest::collection::vec(0u8..=255, 1..32), threshold in 0.0f64..255.0) {
        let previous = grid.clone();
        let current: Vec<u8> = grid.iter().map(|&v| v).collect();
        let result = detect_freeze(&previous, &current, threshold);

        // identical grids always diff to exactly 0.0
        prop_assert_eq!(result.mean_abs_diff, 0.0);
        prop_assert_eq!(result.is_frozen, 0.0 < threshold);
    }

    #[test]
    fn equal_diff_and_threshold_is_never_frozen(value in 1u8..=255) {
        let previous = vec![0u8];
        let current = vec![value];
        let threshold = value as f64;
        let result = detect_freeze(&previous, &current, threshold);

        prop_assert_eq!(result.mean_abs_diff, threshold);
        prop_assert!(!result.is_frozen);
    }
}
