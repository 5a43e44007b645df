//! External integration test wired via `[[test]] name = "zap_engine_learned_method"`, mirroring
//! `libs/core/zap-engine` (§4.11, §8 invariant 4: a run's learned method never changes once set).

use fleetmesh_core_zap_engine::{WindowFrame, ZapDetector};
use proptest::prelude::*;

fn frame(ts: f64, blackscreen: bool, freeze: bool) -> WindowFrame {
    WindowFrame { timestamp_s: ts, blackscreen, freeze, banner_candidate: false, image_url: String::new() }
}

proptest! {
    /// Whatever method a detector learns on its first zap, every later zap in the same run keeps
    /// using that method, even across an arbitrary number of subsequent observations.
    #[test]
    fn learned_method_is_stable_across_the_run(later_zaps in 1usize..6) {
        let mut detector = ZapDetector::new();
        let first = vec![frame(0.0, false, true), frame(1.0, false, false)];
        detector.observe(0.0, &first);
        let learned = detector.learned_method();
        prop_assert!(learned.is_some());

        for i in 0..later_zaps {
            let ts = (i as f64 + 2.0) * 10.0;
            let window = vec![frame(ts, true, false), frame(ts + 1.0, true, false)];
            detector.observe(ts, &window);
            prop_assert_eq!(detector.learned_method(), learned);
        }
    }
}
