//! Response payloads for the prediction and drift endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of scoring a single transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Hard label: 0 = legitimate, 1 = fraud.
    pub prediction: u8,

    /// Fraud probability in [0, 1].
    pub probability: f64,

    /// Convenience boolean derived from the hard label.
    pub is_fraud: bool,
}

/// Drift comparison for one feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDrift {
    /// Whether this feature's mean shifted past the z-score threshold.
    pub drift_detected: bool,

    /// `|new_mean - old_mean| / old_std` against the training baseline.
    pub z_score: f64,

    /// Baseline mean captured at training time.
    pub old_mean: f64,

    /// Mean observed in the new batch.
    pub new_mean: f64,
}

/// Batch-level drift report. Ephemeral: computed per check, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    /// True if any feature drifted.
    pub drift_detected: bool,

    /// Per-feature comparison, keyed by canonical feature name.
    pub details: BTreeMap<String, FeatureDrift>,

    /// When this check ran.
    pub checked_at: DateTime<Utc>,
}

impl DriftReport {
    /// Names of the features flagged as drifting.
    pub fn drifting_features(&self) -> Vec<&str> {
        self.details
            .iter()
            .filter(|(_, d)| d.drift_detected)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
