//! Bagged decision-tree ensemble.
//!
//! Each tree trains on a bootstrap sample with sqrt-feature subsampling at
//! every split. Trees fit in parallel; each derives its own rng from the run
//! seed and its index, so the fitted forest is identical regardless of
//! thread scheduling.

use super::tree::{RegressionTree, TreeParams};
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const N_ESTIMATORS: usize = 100;
const MAX_DEPTH: usize = 12;
const MIN_SAMPLES_LEAF: usize = 2;

/// A fitted forest. The fraud probability is the mean leaf value across
/// trees, each leaf holding the positive fraction of its bootstrap rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn fit(x: &Array2<f64>, y: &[u8], seed: u64) -> Self {
        let targets: Vec<f64> = y.iter().map(|&v| f64::from(v)).collect();
        let n = x.nrows();
        let mtry = ((x.ncols() as f64).sqrt().round() as usize).max(1);
        let params = TreeParams {
            max_depth: MAX_DEPTH,
            min_samples_leaf: MIN_SAMPLES_LEAF,
            feature_subsample: Some(mtry),
        };

        let trees = (0..N_ESTIMATORS)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, &targets, &bootstrap, &params, &mut rng)
            })
            .collect();

        Self { trees }
    }

    pub fn predict_probability(&self, features: ArrayView1<f64>) -> f64 {
        let sum: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        (sum / self.trees.len() as f64).clamp(0.0, 1.0)
    }
}
