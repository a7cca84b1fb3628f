//! Classifier evaluation metrics on the held-out partition.

use serde::{Deserialize, Serialize};

/// Scores for one candidate on the held-out test split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvalMetrics {
    /// Harmonic mean of precision and recall, the selection criterion.
    pub f1: f64,
    /// Area under the ROC curve.
    pub roc_auc: f64,
    /// Area under the precision-recall curve (average precision).
    pub pr_auc: f64,
}

/// Compute the full metric set from fraud probabilities. Hard labels use the
/// 0.5 threshold.
pub fn evaluate(probabilities: &[f64], labels: &[u8]) -> EvalMetrics {
    let predictions: Vec<u8> = probabilities.iter().map(|&p| u8::from(p >= 0.5)).collect();
    EvalMetrics {
        f1: f1_score(&predictions, labels),
        roc_auc: roc_auc(probabilities, labels),
        pr_auc: average_precision(probabilities, labels),
    }
}

/// F1 over hard labels. Zero when precision + recall is zero.
pub fn f1_score(predictions: &[u8], labels: &[u8]) -> f64 {
    let mut tp = 0u64;
    let mut fp = 0u64;
    let mut fn_ = 0u64;

    for (&pred, &label) in predictions.iter().zip(labels.iter()) {
        match (pred, label) {
            (1, 1) => tp += 1,
            (1, 0) => fp += 1,
            (0, 1) => fn_ += 1,
            _ => {}
        }
    }

    if tp == 0 {
        return 0.0;
    }
    let precision = tp as f64 / (tp + fp) as f64;
    let recall = tp as f64 / (tp + fn_) as f64;
    2.0 * precision * recall / (precision + recall)
}

/// ROC AUC via the rank-sum formulation, with average ranks for tied scores.
/// Degenerate single-class inputs score 0.5.
pub fn roc_auc(probabilities: &[f64], labels: &[u8]) -> f64 {
    let n_pos = labels.iter().filter(|&&y| y == 1).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by(|&a, &b| probabilities[a].total_cmp(&probabilities[b]));

    // Average 1-based ranks over tie groups, summed for positives.
    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j < order.len() && probabilities[order[j]] == probabilities[order[i]] {
            j += 1;
        }
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            if labels[idx] == 1 {
                rank_sum_pos += avg_rank;
            }
        }
        i = j;
    }

    let n_pos = n_pos as f64;
    (rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg as f64)
}

/// Average precision: the step-wise area under the precision-recall curve,
/// summed over distinct score thresholds in descending order.
pub fn average_precision(probabilities: &[f64], labels: &[u8]) -> f64 {
    let n_pos = labels.iter().filter(|&&y| y == 1).count();
    if n_pos == 0 {
        return 0.0;
    }

    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));

    let mut tp = 0u64;
    let mut fp = 0u64;
    let mut prev_recall = 0.0;
    let mut ap = 0.0;

    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j < order.len() && probabilities[order[j]] == probabilities[order[i]] {
            if labels[order[j]] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            j += 1;
        }
        let recall = tp as f64 / n_pos as f64;
        let precision = tp as f64 / (tp + fp) as f64;
        ap += (recall - prev_recall) * precision;
        prev_recall = recall;
        i = j;
    }

    ap
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f1_known_case() {
        // tp=2, fp=1, fn=0 -> precision 2/3, recall 1 -> f1 0.8.
        let predictions = [1, 0, 1, 1];
        let labels = [1, 0, 0, 1];
        assert!((f1_score(&predictions, &labels) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_f1_no_true_positives_is_zero() {
        assert_eq!(f1_score(&[0, 0], &[1, 1]), 0.0);
        assert_eq!(f1_score(&[1, 1], &[0, 0]), 0.0);
    }

    #[test]
    fn test_roc_auc_known_case() {
        // Positive scores {0.35, 0.8}, negative {0.1, 0.4}: 3 of 4 ordered
        // pairs rank the positive higher.
        let probabilities = [0.1, 0.4, 0.35, 0.8];
        let labels = [0, 0, 1, 1];
        assert!((roc_auc(&probabilities, &labels) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_perfect_separation() {
        let probabilities = [0.1, 0.2, 0.8, 0.9];
        let labels = [0, 0, 1, 1];
        assert_eq!(roc_auc(&probabilities, &labels), 1.0);
    }

    #[test]
    fn test_roc_auc_ties_average_out() {
        // All scores equal: AUC is exactly 0.5.
        let probabilities = [0.5, 0.5, 0.5, 0.5];
        let labels = [0, 1, 0, 1];
        assert!((roc_auc(&probabilities, &labels) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_single_class_is_neutral() {
        assert_eq!(roc_auc(&[0.2, 0.9], &[1, 1]), 0.5);
    }

    #[test]
    fn test_average_precision_perfect_ranking() {
        let probabilities = [0.9, 0.8, 0.2, 0.1];
        let labels = [1, 1, 0, 0];
        assert!((average_precision(&probabilities, &labels) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_precision_known_case() {
        // Descending: (0.9, pos), (0.6, neg), (0.4, pos), (0.2, neg).
        // AP = 0.5 * 1.0 + 0.5 * (2/3) = 5/6.
        let probabilities = [0.4, 0.9, 0.2, 0.6];
        let labels = [1, 1, 0, 0];
        assert!((average_precision(&probabilities, &labels) - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_uses_half_threshold() {
        let probabilities = [0.49, 0.51];
        let labels = [0, 1];
        let metrics = evaluate(&probabilities, &labels);
        assert_eq!(metrics.f1, 1.0);
        assert_eq!(metrics.roc_auc, 1.0);
    }
}
