//! Gradient-boosted trees on the logistic loss.
//!
//! Each round fits a shallow regression tree to the pseudo-residuals
//! `y - sigmoid(score)` and adds its scaled output to the running score.
//! Prediction is the sigmoid of the accumulated score.

use super::sigmoid;
use super::tree::{RegressionTree, TreeParams};
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

const N_ROUNDS: usize = 100;
const LEARNING_RATE: f64 = 0.1;
const MAX_DEPTH: usize = 3;
const MIN_SAMPLES_LEAF: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    /// Log-odds of the training base rate, the round-zero score.
    init_score: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoosting {
    pub fn fit(x: &Array2<f64>, y: &[u8], seed: u64) -> Self {
        let n = x.nrows();
        let positives = y.iter().filter(|&&v| v == 1).count();
        let prior = (positives as f64 / n as f64).clamp(1e-6, 1.0 - 1e-6);
        let init_score = (prior / (1.0 - prior)).ln();

        let params = TreeParams {
            max_depth: MAX_DEPTH,
            min_samples_leaf: MIN_SAMPLES_LEAF,
            feature_subsample: None,
        };
        let all_rows: Vec<usize> = (0..n).collect();
        // No feature subsampling, so the rng never influences the fit; it
        // only satisfies the tree-fitting signature.
        let mut rng = StdRng::seed_from_u64(seed);

        let mut scores = vec![init_score; n];
        let mut residuals = vec![0.0; n];
        let mut trees = Vec::with_capacity(N_ROUNDS);

        for _ in 0..N_ROUNDS {
            for i in 0..n {
                residuals[i] = f64::from(y[i]) - sigmoid(scores[i]);
            }

            let tree = RegressionTree::fit(x, &residuals, &all_rows, &params, &mut rng);
            for (i, score) in scores.iter_mut().enumerate() {
                *score += LEARNING_RATE * tree.predict(x.row(i));
            }
            trees.push(tree);
        }

        Self {
            init_score,
            learning_rate: LEARNING_RATE,
            trees,
        }
    }

    pub fn predict_probability(&self, features: ArrayView1<f64>) -> f64 {
        let boost: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        sigmoid(self.init_score + self.learning_rate * boost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use ndarray::Array2;

    fn step_data() -> (Array2<f64>, Vec<u8>) {
        let x = Array2::from_shape_fn((30, 2), |(i, j)| (i as f64) + (j as f64) * 0.01);
        let y: Vec<u8> = (0..30).map(|i| u8::from(i >= 15)).collect();
        (x, y)
    }

    #[test]
    fn test_boosting_learns_step() {
        let (x, y) = step_data();
        let model = GradientBoosting::fit(&x, &y, 42);

        assert!(model.predict_probability(array![2.0, 2.0].view()) < 0.5);
        assert!(model.predict_probability(array![27.0, 27.0].view()) > 0.5);
    }

    #[test]
    fn test_boosting_is_deterministic() {
        let (x, y) = step_data();
        let a = GradientBoosting::fit(&x, &y, 1);
        let b = GradientBoosting::fit(&x, &y, 99);

        // The seed only feeds the unused feature-subsample path.
        for i in 0..x.nrows() {
            assert_eq!(a.predict_probability(x.row(i)), b.predict_probability(x.row(i)));
        }
    }

    #[test]
    fn test_probability_is_bounded() {
        let (x, y) = step_data();
        let model = GradientBoosting::fit(&x, &y, 0);
        let p = model.predict_probability(array![15.0, 15.0].view());
        assert!((0.0..=1.0).contains(&p));
    }
}
