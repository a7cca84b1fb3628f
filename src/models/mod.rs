//! Candidate classifiers for the training run.
//!
//! All three expose the same deterministic contract: a fraud probability in
//! [0, 1] over the canonical feature vector, and a hard label at the 0.5
//! threshold.

pub mod boosting;
pub mod forest;
pub mod logistic;
pub mod tree;

pub use boosting::GradientBoosting;
pub use forest::RandomForest;
pub use logistic::LogisticRegression;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Probability at or above which the hard label is fraud.
pub const DECISION_THRESHOLD: f64 = 0.5;

pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// A trained classifier of any candidate family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Classifier {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
}

impl Classifier {
    /// Fraud probability for one canonical feature vector.
    pub fn predict_probability(&self, features: ArrayView1<f64>) -> f64 {
        match self {
            Classifier::LogisticRegression(model) => model.predict_probability(features),
            Classifier::RandomForest(model) => model.predict_probability(features),
            Classifier::GradientBoosting(model) => model.predict_probability(features),
        }
    }

    /// Hard label at the 0.5 threshold.
    pub fn predict(&self, features: ArrayView1<f64>) -> u8 {
        u8::from(self.predict_probability(features) >= DECISION_THRESHOLD)
    }

    /// Probabilities for every row of a feature matrix.
    pub fn predict_probabilities(&self, x: &Array2<f64>) -> Vec<f64> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_probability(row))
            .collect()
    }
}
