//! Baseline feature statistics captured at training time.
//!
//! The snapshot is taken over the exact post-resampling feature matrix the
//! winning model trained on, and is the reference distribution for every
//! drift check until the next training run. One baseline per model; no
//! history.

use crate::preprocessing::quantile;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics for one feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub count: u64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub median: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

/// Per-feature summary table, keyed by canonical feature name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaselineStats {
    features: BTreeMap<String, FeatureSummary>,
}

impl BaselineStats {
    /// Snapshot the columns of `x` under the given names.
    pub fn capture(x: &Array2<f64>, feature_names: &[&str]) -> Self {
        let features = feature_names
            .iter()
            .enumerate()
            .map(|(col, &name)| {
                let column = x.index_axis(Axis(1), col);
                (name.to_string(), summarize(column.to_vec()))
            })
            .collect();
        Self { features }
    }

    pub fn get(&self, feature: &str) -> Option<&FeatureSummary> {
        self.features.get(feature)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_means(entries: &[(&str, f64, f64)]) -> Self {
        let features = entries
            .iter()
            .map(|&(name, mean, std)| {
                (
                    name.to_string(),
                    FeatureSummary {
                        count: 0,
                        mean,
                        std,
                        min: 0.0,
                        q25: 0.0,
                        median: 0.0,
                        q75: 0.0,
                        max: 0.0,
                    },
                )
            })
            .collect();
        Self { features }
    }
}

fn summarize(mut values: Vec<f64>) -> FeatureSummary {
    let n = values.len();
    if n == 0 {
        return FeatureSummary {
            count: 0,
            mean: 0.0,
            std: 0.0,
            min: 0.0,
            q25: 0.0,
            median: 0.0,
            q75: 0.0,
            max: 0.0,
        };
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    // Sample standard deviation, matching the usual describe() convention.
    let std = if n > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };

    values.sort_by(|a, b| a.total_cmp(b));
    FeatureSummary {
        count: n as u64,
        mean,
        std,
        min: values[0],
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values[n - 1],
    }
}
