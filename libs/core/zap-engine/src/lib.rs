// [libs/core/zap-engine/src/lib.rs]
//! Event-scoped zap-detection state machine (C11, spec §4.11). Pure: a caller feeds in the
//! per-frame blackscreen/freeze verdicts already computed by
//! [`fleetmesh_core_frame_analysis`]; banner/channel-info extraction is an external AI-service
//! call and lives one layer up (`fleetmesh-domain-ai-gateway`), not here.

use fleetmesh_domain_models::{ZapMethod, ZapRunStats};

/// Maximum number of frames inspected per zap event (§4.11: "within the next ≤10 frames").
pub const ZAP_WINDOW_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct WindowFrame {
    pub timestamp_s: f64,
    pub blackscreen: bool,
    pub freeze: bool,
    /// Cheap heuristic fired for this frame; gates whether a banner/channel-info AI call is
    /// worth issuing (§4.11 "Banner analysis").
    pub banner_candidate: bool,
    /// Location of this frame's keyframe image, so a caller whose `banner_candidate` fired can
    /// resolve the actual candidate frame rather than whatever frame happens to be cached latest.
    pub image_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    LearnOrUse,
    Detect,
    Done,
}

/// Outcome of processing one zap event's frame window.
#[derive(Debug, Clone, PartialEq)]
pub struct ZapOutcome {
    pub detected: bool,
    pub method: Option<ZapMethod>,
    pub duration_s: f64,
    /// Frame indices whose `banner_candidate` fired, for the caller to feed to the AI service.
    pub banner_candidate_indices: Vec<usize>,
}

/// Scoped to a single test run: `learned_method`, once set, is used exclusively for every
/// subsequent zap of that run (§4.11, §8 invariant 4).
#[derive(Debug, Clone)]
pub struct ZapDetector {
    state: State,
    learned: Option<ZapMethod>,
    stats: ZapRunStats,
}

impl Default for ZapDetector {
    fn default() -> Self {
        Self {
            state: State::Idle,
            learned: None,
            stats: ZapRunStats::default(),
        }
    }
}

impl ZapDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn learned_method(&self) -> Option<ZapMethod> {
        self.learned
    }

    pub fn stats(&self) -> &ZapRunStats {
        &self.stats
    }

    /// Called by C12 at `key_release_ts`. Transitions `IDLE -> LEARN_OR_USE` (no learned
    /// method yet) or `IDLE -> DETECT` (method already learned this run), then immediately
    /// evaluates `window` (truncated to [`ZAP_WINDOW_SIZE`] frames) and becomes terminal
    /// (`DONE`) after emitting the single event this call produces.
    pub fn observe(&mut self, key_release_ts: f64, window: &[WindowFrame]) -> ZapOutcome {
        let window = &window[..window.len().min(ZAP_WINDOW_SIZE)];
        self.stats.iterations += 1;

        self.state = if self.learned.is_some() {
            State::Detect
        } else {
            State::LearnOrUse
        };

        let outcome = match self.state {
            State::Detect => self.detect_with_learned(key_release_ts, window),
            State::LearnOrUse => self.learn_or_use(key_release_ts, window),
            State::Idle | State::Done => unreachable!("observe always sets LearnOrUse or Detect"),
        };

        self.state = State::Done;

        if outcome.detected {
            self.stats.zap_detected_count += 1;
            self.stats.durations.push(outcome.duration_s);
        }
        if !outcome.banner_candidate_indices.is_empty() {
            self.stats.motion_detected_count += 1;
        }

        outcome
    }

    fn learn_or_use(&mut self, key_release_ts: f64, window: &[WindowFrame]) -> ZapOutcome {
        if let Some(outcome) = measure_transition(window, key_release_ts, |f| f.blackscreen) {
            self.learned = Some(ZapMethod::Blackscreen);
            self.stats.learned_method = self.learned;
            return ZapOutcome {
                detected: true,
                method: Some(ZapMethod::Blackscreen),
                ..outcome
            };
        }
        if let Some(outcome) = measure_transition(window, key_release_ts, |f| f.freeze) {
            self.learned = Some(ZapMethod::Freeze);
            self.stats.learned_method = self.learned;
            return ZapOutcome {
                detected: true,
                method: Some(ZapMethod::Freeze),
                ..outcome
            };
        }
        not_detected(window)
    }

    fn detect_with_learned(&self, key_release_ts: f64, window: &[WindowFrame]) -> ZapOutcome {
        let method = self.learned.expect("DETECT state requires a learned method");
        let predicate: fn(&WindowFrame) -> bool = match method {
            ZapMethod::Blackscreen => |f| f.blackscreen,
            ZapMethod::Freeze => |f| f.freeze,
        };
        match measure_transition(window, key_release_ts, predicate) {
            Some(outcome) => ZapOutcome {
                method: Some(method),
                ..outcome
            },
            None => not_detected(window),
        }
    }
}

fn not_detected(window: &[WindowFrame]) -> ZapOutcome {
    ZapOutcome {
        detected: false,
        method: None,
        duration_s: 0.0,
        banner_candidate_indices: banner_indices(window),
    }
}

fn banner_indices(window: &[WindowFrame]) -> Vec<usize> {
    window
        .iter()
        .enumerate()
        .filter(|(_, f)| f.banner_candidate)
        .map(|(i, _)| i)
        .collect()
}

/// Scans `window` for the transition: a frame where `effect` holds (the zap is in progress),
/// followed by the first subsequent frame where it no longer holds (content has returned).
/// Returns `None` if `effect` never fires at all in the window — the caller's `learn_or_use`
/// then falls through to the next candidate method, or reports `not_detected`.
fn measure_transition(
    window: &[WindowFrame],
    key_release_ts: f64,
    effect: impl Fn(&WindowFrame) -> bool,
) -> Option<ZapOutcome> {
    let start = window.iter().position(|f| effect(f))?;
    let end = window[start..]
        .iter()
        .position(|f| !effect(f))
        .map(|offset| start + offset);

    let end_frame = match end {
        Some(idx) => window[idx].clone(),
        None => window.last()?.clone(),
    };

    Some(ZapOutcome {
        detected: true,
        method: None,
        duration_s: end_frame.timestamp_s - key_release_ts,
        banner_candidate_indices: banner_indices(window),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(ts: f64, blackscreen: bool, freeze: bool) -> WindowFrame {
        WindowFrame {
            timestamp_s: ts,
            blackscreen,
            freeze,
            banner_candidate: false,
            image_url: format!("capture_{ts}.jpg"),
        }
    }

    /// Mirrors scenario S4 (spec §8): first zap has an empty blackscreen window but a freeze
    /// window with two consecutive frozen frames; learns `freeze` and reports ~2.0s duration.
    #[test]
    fn first_zap_learns_freeze_when_blackscreen_never_fires() {
        let mut detector = ZapDetector::new();
        let window = vec![
            frame(0.0, false, true),
            frame(1.0, false, true),
            frame(2.0, false, false),
        ];
        let outcome = detector.observe(0.0, &window);
        assert!(outcome.detected);
        assert_eq!(outcome.method, Some(ZapMethod::Freeze));
        assert!((outcome.duration_s - 2.0).abs() < f64::EPSILON);
        assert_eq!(detector.learned_method(), Some(ZapMethod::Freeze));
    }

    /// Second zap in the same run only evaluates the learned method, even if blackscreen would
    /// also have fired (§8 invariant 4).
    #[test]
    fn second_zap_uses_learned_method_exclusively() {
        let mut detector = ZapDetector::new();
        let first_window = vec![frame(0.0, false, true), frame(1.0, false, false)];
        detector.observe(0.0, &first_window);
        assert_eq!(detector.learned_method(), Some(ZapMethod::Freeze));

        // This window has a blackscreen effect but no freeze; a blackscreen-aware detector
        // would fire, but the learned method is freeze, so this must report not_detected.
        let second_window = vec![frame(10.0, true, false), frame(11.0, false, false)];
        let outcome = detector.observe(10.0, &second_window);
        assert!(!outcome.detected);
        assert_eq!(detector.learned_method(), Some(ZapMethod::Freeze));
    }

    /// Boundary: a full 10-frame window with neither effect reports not_detected and records
    /// no learned method (§8 boundary behaviors).
    #[test]
    fn full_window_with_no_effect_is_not_detected() {
        let mut detector = ZapDetector::new();
        let window: Vec<WindowFrame> = (0..10).map(|i| frame(i as f64, false, false)).collect();
        let outcome = detector.observe(0.0, &window);
        assert!(!outcome.detected);
        assert!(outcome.method.is_none());
        assert!(detector.learned_method().is_none());
    }
}
