//! Mean-shift drift detection against the training baseline.
//!
//! Compares a new batch's per-feature means with baseline means using a
//! z-score threshold. This is deliberately a mean-shift check on summary
//! statistics, not a full distributional test; the baseline artifact does
//! not carry enough to do better.

use crate::baseline::BaselineStats;
use crate::data::BatchColumns;
use crate::types::report::{DriftReport, FeatureDrift};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// z-score reported when the baseline column has zero variance but the
/// batch mean moved anyway: definite drift.
pub const ZERO_STD_SENTINEL: f64 = 999.0;

/// Compare batch means against the baseline. Only features present in both
/// are reported; the aggregate flag is the OR over per-feature flags.
pub fn check(batch: &BatchColumns, baseline: &BaselineStats, z_threshold: f64) -> DriftReport {
    let mut details = BTreeMap::new();
    let mut drift_detected = false;

    for (name, values) in batch.iter() {
        if values.is_empty() {
            continue;
        }
        let Some(summary) = baseline.get(name) else {
            continue;
        };

        let new_mean = values.iter().sum::<f64>() / values.len() as f64;
        let z_score = if summary.std > 0.0 {
            (new_mean - summary.mean).abs() / summary.std
        } else if new_mean == summary.mean {
            0.0
        } else {
            ZERO_STD_SENTINEL
        };

        let feature_drifted = z_score > z_threshold;
        if feature_drifted {
            debug!(
                feature = name,
                z_score = z_score,
                old_mean = summary.mean,
                new_mean = new_mean,
                "Feature mean shifted past threshold"
            );
        }
        drift_detected |= feature_drifted;

        details.insert(
            name.to_string(),
            FeatureDrift {
                drift_detected: feature_drifted,
                z_score,
                old_mean: summary.mean,
                new_mean,
            },
        );
    }

    let report = DriftReport {
        drift_detected,
        details,
        checked_at: Utc::now(),
    };

    info!(
        drift_detected = report.drift_detected,
        features_checked = report.details.len(),
        features_drifted = report.drifting_features().len(),
        "Drift check complete"
    );

    report
}
