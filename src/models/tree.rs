//! CART regression tree, the base learner for both ensembles.
//!
//! Fitting minimizes the summed squared error of the two children at each
//! split. On binary 0/1 targets this matches impurity-based splitting; on
//! boosting residuals it is plain least-squares regression.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Splits with fewer candidate rows than this on either side are rejected.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Number of features considered per split; `None` means all.
    pub feature_subsample: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A fitted tree. Prediction is the mean target of the reached leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    /// Fit on the rows named by `indices` (repeats allowed, for bootstrap
    /// samples). The rng only matters when `feature_subsample` is set.
    pub fn fit(
        x: &Array2<f64>,
        y: &[f64],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        Self {
            root: build_node(x, y, indices, params, 0, rng),
        }
    }

    pub fn predict(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

fn build_node(
    x: &Array2<f64>,
    y: &[f64],
    indices: &[usize],
    params: &TreeParams,
    depth: usize,
    rng: &mut StdRng,
) -> Node {
    let n = indices.len();
    let sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let sum_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let mean = sum / n as f64;
    let sse = sum_sq - sum * sum / n as f64;

    if depth >= params.max_depth || n < 2 * params.min_samples_leaf || sse < 1e-12 {
        return Node::Leaf { value: mean };
    }

    let n_features = x.ncols();
    let candidates: Vec<usize> = match params.feature_subsample {
        Some(m) if m < n_features => rand::seq::index::sample(rng, n_features, m).into_vec(),
        _ => (0..n_features).collect(),
    };

    let mut best: Option<(f64, usize, f64)> = None; // (child sse, feature, threshold)

    for &feature in &candidates {
        let mut values: Vec<(f64, f64)> =
            indices.iter().map(|&i| (x[[i, feature]], y[i])).collect();
        values.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        let mut left_sum_sq = 0.0;

        for k in 1..n {
            left_sum += values[k - 1].1;
            left_sum_sq += values[k - 1].1 * values[k - 1].1;

            if values[k - 1].0 == values[k].0 {
                continue;
            }
            if k < params.min_samples_leaf || n - k < params.min_samples_leaf {
                continue;
            }

            let right_sum = sum - left_sum;
            let right_sum_sq = sum_sq - left_sum_sq;
            let left_sse = left_sum_sq - left_sum * left_sum / k as f64;
            let right_sse = right_sum_sq - right_sum * right_sum / (n - k) as f64;
            let score = left_sse + right_sse;

            if best.map_or(true, |(best_score, _, _)| score < best_score - 1e-12) {
                let threshold = (values[k - 1].0 + values[k].0) / 2.0;
                best = Some((score, feature, threshold));
            }
        }
    }

    let Some((_, feature, threshold)) = best else {
        // Every candidate feature was constant on this node.
        return Node::Leaf { value: mean };
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| x[[i, feature]] <= threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_node(x, y, &left_idx, params, depth + 1, rng)),
        right: Box::new(build_node(x, y, &right_idx, params, depth + 1, rng)),
    }
}
