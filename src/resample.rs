//! Synthetic minority oversampling for the training partition.
//!
//! New minority samples are interpolated between a real minority sample and
//! one of its nearest minority neighbors. Applied to the training split
//! only; resampling the test split or serving data corrupts evaluation.

use crate::error::{PipelineError, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

/// Neighbors considered per minority sample.
const NEIGHBORS: usize = 5;

/// Oversample the minority class until its count reaches
/// `ratio × majority count`. Deterministic for a fixed seed. Returns the
/// original rows (unchanged, in order) followed by the synthetic rows.
pub fn resample(
    features: &Array2<f64>,
    labels: &[u8],
    ratio: f64,
    seed: u64,
) -> Result<(Array2<f64>, Vec<u8>)> {
    if !(0.0..=1.0).contains(&ratio) || ratio == 0.0 {
        return Err(PipelineError::PreprocessingError(format!(
            "resample ratio must be in (0, 1], got {}",
            ratio
        )));
    }
    if features.nrows() != labels.len() {
        return Err(PipelineError::PreprocessingError(format!(
            "{} feature rows but {} labels",
            features.nrows(),
            labels.len()
        )));
    }

    let positives = labels.iter().filter(|&&y| y == 1).count();
    let negatives = labels.len() - positives;
    let (minority_class, minority_count, majority_count) = if positives <= negatives {
        (1u8, positives, negatives)
    } else {
        (0u8, negatives, positives)
    };

    let target = (majority_count as f64 * ratio).round() as usize;
    if minority_count == 0 || minority_count >= target {
        return Ok((features.clone(), labels.to_vec()));
    }
    if minority_count < 2 {
        warn!(
            minority_count = minority_count,
            "Too few minority samples to interpolate, skipping resampling"
        );
        return Ok((features.clone(), labels.to_vec()));
    }

    let minority_idx: Vec<usize> = labels
        .iter()
        .enumerate()
        .filter(|(_, &y)| y == minority_class)
        .map(|(i, _)| i)
        .collect();

    // Nearest minority neighbors per minority sample, brute force. The
    // minority class is small by definition, so O(m^2) is fine.
    let k = NEIGHBORS.min(minority_count - 1);
    let neighbor_lists: Vec<Vec<usize>> = minority_idx
        .iter()
        .map(|&i| {
            let mut distances: Vec<(f64, usize)> = minority_idx
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| {
                    let d = features
                        .row(i)
                        .iter()
                        .zip(features.row(j).iter())
                        .map(|(a, b)| (a - b).powi(2))
                        .sum::<f64>();
                    (d, j)
                })
                .collect();
            distances.sort_by(|a, b| a.0.total_cmp(&b.0));
            distances.into_iter().take(k).map(|(_, j)| j).collect()
        })
        .collect();

    let synth_needed = target - minority_count;
    let n_features = features.ncols();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut synthetic = Vec::with_capacity(synth_needed * n_features);

    for s in 0..synth_needed {
        let base_pos = s % minority_idx.len();
        let base = minority_idx[base_pos];
        let neighbor = neighbor_lists[base_pos][rng.gen_range(0..k)];
        let gap: f64 = rng.gen();

        for (a, b) in features.row(base).iter().zip(features.row(neighbor).iter()) {
            synthetic.push(a + gap * (b - a));
        }
    }

    let mut combined = features
        .as_standard_layout()
        .iter()
        .copied()
        .collect::<Vec<f64>>();
    combined.extend_from_slice(&synthetic);

    let resampled = Array2::from_shape_vec((labels.len() + synth_needed, n_features), combined)
        .map_err(|e| PipelineError::PreprocessingError(e.to_string()))?;

    let mut resampled_labels = labels.to_vec();
    resampled_labels.extend(std::iter::repeat(minority_class).take(synth_needed));

    debug!(
        synthesized = synth_needed,
        minority_before = minority_count,
        minority_after = minority_count + synth_needed,
        "Minority class oversampled"
    );

    Ok((resampled, resampled_labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn imbalanced(n_major: usize, n_minor: usize) -> (Array2<f64>, Vec<u8>) {
        let n = n_major + n_minor;
        let features = Array2::from_shape_fn((n, 4), |(i, j)| {
            if i < n_major {
                (i + j) as f64
            } else {
                1000.0 + (i + j) as f64
            }
        });
        let mut labels = vec![0u8; n_major];
        labels.extend(vec![1u8; n_minor]);
        (features, labels)
    }

    #[test]
    fn test_resample_balances_classes() {
        let (features, labels) = imbalanced(50, 5);
        let (x, y) = resample(&features, &labels, 1.0, 42).unwrap();

        let positives = y.iter().filter(|&&l| l == 1).count();
        assert_eq!(positives, 50);
        assert_eq!(x.nrows(), 100);
    }

    #[test]
    fn test_resample_partial_ratio() {
        let (features, labels) = imbalanced(100, 10);
        let (_, y) = resample(&features, &labels, 0.5, 42).unwrap();

        let positives = y.iter().filter(|&&l| l == 1).count();
        assert_eq!(positives, 50);
    }

    #[test]
    fn test_resample_keeps_original_rows_unchanged() {
        let (features, labels) = imbalanced(20, 4);
        let (x, y) = resample(&features, &labels, 1.0, 42).unwrap();

        for i in 0..labels.len() {
            assert_eq!(x.row(i), features.row(i));
            assert_eq!(y[i], labels[i]);
        }
    }

    #[test]
    fn test_resample_is_deterministic() {
        let (features, labels) = imbalanced(30, 6);
        let (a, _) = resample(&features, &labels, 1.0, 9).unwrap();
        let (b, _) = resample(&features, &labels, 1.0, 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_synthetic_rows_interpolate_minority_space() {
        let (features, labels) = imbalanced(40, 5);
        let (x, _) = resample(&features, &labels, 1.0, 13).unwrap();

        // Synthetic rows live in the minority bounding box, far from the
        // majority cluster around the origin.
        for i in labels.len()..x.nrows() {
            for value in x.row(i) {
                assert!(*value >= 1000.0, "synthetic value {} outside minority space", value);
            }
        }
    }

    #[test]
    fn test_balanced_input_is_untouched() {
        let (features, labels) = imbalanced(10, 10);
        let (x, y) = resample(&features, &labels, 1.0, 42).unwrap();
        assert_eq!(x, features);
        assert_eq!(y, labels);
    }

    #[test]
    fn test_rejects_bad_ratio() {
        let (features, labels) = imbalanced(10, 2);
        assert!(resample(&features, &labels, 0.0, 1).is_err());
        assert!(resample(&features, &labels, 1.5, 1).is_err());
    }
}
