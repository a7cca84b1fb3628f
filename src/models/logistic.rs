//! Logistic regression fitted by batch gradient descent.

use super::sigmoid;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

const LEARNING_RATE: f64 = 0.1;
const MAX_ITER: usize = 1000;
const TOLERANCE: f64 = 1e-6;

/// Linear probabilistic classifier over the canonical feature vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Array1<f64>,
    bias: f64,
}

impl LogisticRegression {
    /// Fit with full-batch gradient descent from a zero initialization.
    /// Fully deterministic: same data, same model.
    pub fn fit(x: &Array2<f64>, y: &[u8]) -> Self {
        let n = x.nrows() as f64;
        let targets = Array1::from_iter(y.iter().map(|&v| f64::from(v)));
        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;

        for _ in 0..MAX_ITER {
            let logits = x.dot(&weights) + bias;
            let errors = logits.mapv(sigmoid) - &targets;
            let grad_w = x.t().dot(&errors) / n;
            let grad_b = errors.sum() / n;

            weights.scaled_add(-LEARNING_RATE, &grad_w);
            bias -= LEARNING_RATE * grad_b;

            let grad_max = grad_w.iter().fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if grad_max < TOLERANCE {
                break;
            }
        }

        Self { weights, bias }
    }

    pub fn predict_probability(&self, features: ArrayView1<f64>) -> f64 {
        sigmoid(features.dot(&self.weights) + self.bias)
    }
}
