// [libs/domain/capture-analysis/src/retention.rs]
//! Capture-record retention pruning (§4.9, §4.10 lifecycle note: "frame records... pruned by
//! retention"). A record is a candidate for deletion once it is older than `max_age`, subject
//! to always keeping at least the most recent `min_keep` records per device so a freshly-idle
//! device never loses its latest sidecar to an aggressive sweep.

use chrono::{DateTime, Duration, Utc};
use fleetmesh_domain_models::CaptureFrameRecord;

#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub max_age: Duration,
    pub min_keep_per_device: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::hours(24),
            min_keep_per_device: 1,
        }
    }
}

/// Returns the subset of `records` that are safe to delete under `policy`, evaluated against
/// `now`. Grouping is per `device_id`: each device retains its newest `min_keep_per_device`
/// records regardless of age.
pub fn prune_candidates<'a>(
    records: &'a [CaptureFrameRecord],
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> Vec<&'a CaptureFrameRecord> {
    use std::collections::HashMap;

    let mut by_device: HashMap<&str, Vec<&CaptureFrameRecord>> = HashMap::new();
    for record in records {
        by_device.entry(record.device_id.as_str()).or_default().push(record);
    }

    let mut candidates = Vec::new();
    for device_records in by_device.values_mut() {
        device_records.sort_by_key(|r| r.timestamp);
        let prunable_len = device_records.len().saturating_sub(policy.min_keep_per_device);
        for record in &device_records[..prunable_len] {
            if now.signed_duration_since(record.timestamp) > policy.max_age {
                candidates.push(*record);
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetmesh_domain_models::FrameAnalysis;

    fn record(device_id: &str, sequence: u64, age_hours: i64, now: DateTime<Utc>) -> CaptureFrameRecord {
        CaptureFrameRecord {
            device_id: device_id.into(),
            sequence,
            timestamp: now - Duration::hours(age_hours),
            image_url: format!("capture_{sequence}.jpg"),
            analysis: FrameAnalysis::default(),
        }
    }

    #[test]
    fn prunes_only_records_older_than_max_age() {
        let now = Utc::now();
        let records = vec![
            record("dev1", 1, 48, now),
            record("dev1", 2, 1, now),
        ];
        let policy = RetentionPolicy {
            max_age: Duration::hours(24),
            min_keep_per_device: 0,
        };
        let candidates = prune_candidates(&records, &policy, now);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].sequence, 1);
    }

    #[test]
    fn always_keeps_min_keep_newest_even_if_old() {
        let now = Utc::now();
        let records = vec![record("dev1", 1, 999, now)];
        let policy = RetentionPolicy {
            max_age: Duration::hours(24),
            min_keep_per_device: 1,
        };
        let candidates = prune_candidates(&records, &policy, now);
        assert!(candidates.is_empty());
    }

    #[test]
    fn devices_are_pruned_independently() {
        let now = Utc::now();
        let records = vec![record("dev1", 1, 48, now), record("dev2", 1, 48, now)];
        let policy = RetentionPolicy {
            max_age: Duration::hours(24),
            min_keep_per_device: 0,
        };
        let candidates = prune_candidates(&records, &policy, now);
        assert_eq!(candidates.len(), 2);
    }
}
