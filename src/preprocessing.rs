//! Feature pipeline: cleaning, robust scaling, and the stratified split.
//!
//! The scaler follows a strict fit/transform asymmetry: parameters are fit
//! once on the training split and applied read-only everywhere else,
//! including the held-out split and live requests. Refitting on anything but
//! training data is a leakage bug.

use crate::data::RawDataset;
use crate::error::{PipelineError, Result};
use crate::types::transaction::{AMOUNT_INDEX, FEATURE_COUNT, TIME_INDEX};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Remove exact-duplicate rows and impute missing cells with the per-column
/// median of the batch. Returns the dense feature matrix and aligned labels.
pub fn clean(raw: &RawDataset) -> (Array2<f64>, Vec<u8>) {
    // Dedupe on the bit patterns of all cells plus the label. `None` encodes
    // as a bit pattern no finite f64 can produce.
    let mut seen: HashSet<(Vec<u64>, u8)> = HashSet::with_capacity(raw.len());
    let mut rows: Vec<&Vec<Option<f64>>> = Vec::with_capacity(raw.len());
    let mut labels: Vec<u8> = Vec::with_capacity(raw.len());

    for (row, &label) in raw.features.iter().zip(raw.labels.iter()) {
        let key: Vec<u64> = row
            .iter()
            .map(|cell| cell.map_or(u64::MAX, f64::to_bits))
            .collect();
        if seen.insert((key, label)) {
            rows.push(row);
            labels.push(label);
        }
    }

    let removed = raw.len() - rows.len();
    if removed > 0 {
        debug!(removed = removed, "Removed duplicate rows");
    }

    // Per-column medians over the present values.
    let mut medians = [0.0f64; FEATURE_COUNT];
    for (col, median_slot) in medians.iter_mut().enumerate() {
        let mut values: Vec<f64> = rows.iter().filter_map(|row| row[col]).collect();
        if !values.is_empty() {
            values.sort_by(|a, b| a.total_cmp(b));
            *median_slot = quantile(&values, 0.5);
        }
    }

    let mut features = Array2::<f64>::zeros((rows.len(), FEATURE_COUNT));
    for (i, row) in rows.iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            features[[i, j]] = cell.unwrap_or(medians[j]);
        }
    }

    (features, labels)
}

/// Robust scaling parameters for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    pub median: f64,
    pub iqr: f64,
}

impl ColumnScale {
    fn fit(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Self {
            median: quantile(&sorted, 0.5),
            iqr: quantile(&sorted, 0.75) - quantile(&sorted, 0.25),
        }
    }

    /// Transform one value. A zero-IQR column passes through unchanged
    /// instead of dividing by zero.
    pub fn transform(&self, value: f64) -> f64 {
        if self.iqr == 0.0 {
            value
        } else {
            (value - self.median) / self.iqr
        }
    }

    /// Invert the transform; identity for a zero-IQR column.
    pub fn inverse(&self, value: f64) -> f64 {
        if self.iqr == 0.0 {
            value
        } else {
            value * self.iqr + self.median
        }
    }
}

/// Fitted scaler state for exactly the `Time` and `Amount` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerState {
    pub time: ColumnScale,
    pub amount: ColumnScale,
}

impl ScalerState {
    /// Fit on the training split only.
    pub fn fit(train: &Array2<f64>) -> Self {
        let time_col = train.index_axis(Axis(1), TIME_INDEX);
        let amount_col = train.index_axis(Axis(1), AMOUNT_INDEX);
        Self {
            time: ColumnScale::fit(time_col.to_vec().as_slice()),
            amount: ColumnScale::fit(amount_col.to_vec().as_slice()),
        }
    }

    /// Apply previously fitted parameters to a row set. Never refits.
    pub fn transform(&self, features: &mut Array2<f64>) -> Result<()> {
        for mut row in features.rows_mut() {
            self.check_finite(row[TIME_INDEX], row[AMOUNT_INDEX])?;
            row[TIME_INDEX] = self.time.transform(row[TIME_INDEX]);
            row[AMOUNT_INDEX] = self.amount.transform(row[AMOUNT_INDEX]);
        }
        Ok(())
    }

    /// Apply to a single canonical feature vector (the serving path).
    pub fn transform_vector(&self, features: &mut [f64]) -> Result<()> {
        if features.len() != FEATURE_COUNT {
            return Err(PipelineError::PreprocessingError(format!(
                "expected {} features, got {}",
                FEATURE_COUNT,
                features.len()
            )));
        }
        self.check_finite(features[TIME_INDEX], features[AMOUNT_INDEX])?;
        features[TIME_INDEX] = self.time.transform(features[TIME_INDEX]);
        features[AMOUNT_INDEX] = self.amount.transform(features[AMOUNT_INDEX]);
        Ok(())
    }

    /// Scaling parameters for a named column, if that column is scaled.
    pub fn scale_for(&self, column: &str) -> Option<&ColumnScale> {
        match column {
            "Time" => Some(&self.time),
            "Amount" => Some(&self.amount),
            _ => None,
        }
    }

    fn check_finite(&self, time: f64, amount: f64) -> Result<()> {
        if !time.is_finite() || !amount.is_finite() {
            return Err(PipelineError::PreprocessingError(
                "non-finite value in Time/Amount".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fit the scaler on the training split and transform it in place.
pub fn fit_scale(train: &mut Array2<f64>) -> Result<ScalerState> {
    let state = ScalerState::fit(train);
    state.transform(train)?;
    Ok(state)
}

/// Train/test partitions produced by the stratified split.
#[derive(Debug, Clone)]
pub struct SplitDataset {
    pub train_x: Array2<f64>,
    pub train_y: Vec<u8>,
    pub test_x: Array2<f64>,
    pub test_y: Vec<u8>,
}

/// Stratified split preserving the class proportion in both partitions.
/// Reproducible for a fixed seed.
pub fn stratified_split(
    features: &Array2<f64>,
    labels: &[u8],
    test_fraction: f64,
    seed: u64,
) -> Result<SplitDataset> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(PipelineError::PreprocessingError(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }
    if features.nrows() != labels.len() {
        return Err(PipelineError::PreprocessingError(format!(
            "{} feature rows but {} labels",
            features.nrows(),
            labels.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_idx: Vec<usize> = Vec::new();
    let mut test_idx: Vec<usize> = Vec::new();

    for class in [0u8, 1u8] {
        let mut idx: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &y)| y == class)
            .map(|(i, _)| i)
            .collect();
        if idx.is_empty() {
            continue;
        }
        idx.shuffle(&mut rng);

        // Keep at least one row of each class on the training side.
        let n_test = ((idx.len() as f64 * test_fraction).round() as usize).min(idx.len() - 1);
        test_idx.extend_from_slice(&idx[..n_test]);
        train_idx.extend_from_slice(&idx[n_test..]);
    }

    train_idx.sort_unstable();
    test_idx.sort_unstable();

    Ok(SplitDataset {
        train_x: features.select(Axis(0), &train_idx),
        train_y: train_idx.iter().map(|&i| labels[i]).collect(),
        test_x: features.select(Axis(0), &test_idx),
        test_y: test_idx.iter().map(|&i| labels[i]).collect(),
    })
}

/// Linear-interpolated quantile over an ascending-sorted, non-empty slice.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn raw_row(value: f64) -> Vec<Option<f64>> {
        vec![Some(value); FEATURE_COUNT]
    }

    fn matrix_with_time_amount(rows: &[(f64, f64)]) -> Array2<f64> {
        let mut features = Array2::<f64>::zeros((rows.len(), FEATURE_COUNT));
        for (i, &(time, amount)) in rows.iter().enumerate() {
            features[[i, TIME_INDEX]] = time;
            features[[i, AMOUNT_INDEX]] = amount;
        }
        features
    }

    #[test]
    fn test_clean_removes_duplicates() {
        let raw = RawDataset {
            features: vec![raw_row(1.0), raw_row(1.0), raw_row(2.0)],
            labels: vec![0, 0, 1],
        };

        let (features, labels) = clean(&raw);
        assert_eq!(features.nrows(), 2);
        assert_eq!(labels, vec![0, 1]);
    }

    #[test]
    fn test_clean_keeps_same_features_with_different_label() {
        let raw = RawDataset {
            features: vec![raw_row(1.0), raw_row(1.0)],
            labels: vec![0, 1],
        };

        let (features, _) = clean(&raw);
        assert_eq!(features.nrows(), 2);
    }

    #[test]
    fn test_clean_imputes_column_median() {
        let mut with_gap = raw_row(5.0);
        with_gap[2] = None;
        let raw = RawDataset {
            features: vec![raw_row(1.0), raw_row(3.0), with_gap],
            labels: vec![0, 0, 1],
        };

        let (features, _) = clean(&raw);
        // Median of the present values 1.0 and 3.0.
        assert_eq!(features[[2, 2]], 2.0);
        assert_eq!(features[[2, 3]], 5.0);
    }

    #[test]
    fn test_scaler_known_values() {
        let rows: Vec<(f64, f64)> = [1.0, 2.0, 3.0, 4.0, 5.0].iter().map(|&v| (v, v)).collect();
        let train = matrix_with_time_amount(&rows);

        let state = ScalerState::fit(&train);
        // Median 3, IQR = 4 - 2 = 2.
        assert_eq!(state.time.median, 3.0);
        assert_eq!(state.time.iqr, 2.0);
        assert_eq!(state.amount.transform(5.0), 1.0);
        assert_eq!(state.amount.transform(3.0), 0.0);
    }

    #[test]
    fn test_scaler_roundtrip_is_identity() {
        let rows: Vec<(f64, f64)> = (0..20).map(|i| (i as f64 * 7.5, i as f64 * 13.25)).collect();
        let train = matrix_with_time_amount(&rows);
        let state = ScalerState::fit(&train);

        for &(time, amount) in &rows {
            assert!((state.time.inverse(state.time.transform(time)) - time).abs() < 1e-9);
            assert!((state.amount.inverse(state.amount.transform(amount)) - amount).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scaler_zero_iqr_passes_through() {
        let rows = vec![(7.0, 7.0); 4];
        let train = matrix_with_time_amount(&rows);
        let state = ScalerState::fit(&train);

        assert_eq!(state.time.iqr, 0.0);
        assert_eq!(state.time.transform(7.0), 7.0);
        assert_eq!(state.time.transform(123.0), 123.0);
    }

    #[test]
    fn test_transform_never_alters_fitted_parameters() {
        let train = matrix_with_time_amount(&[(1.0, 10.0), (2.0, 20.0), (3.0, 30.0)]);
        let state = ScalerState::fit(&train);
        let snapshot = state.clone();

        let mut other = matrix_with_time_amount(&[(100.0, -5.0), (250.0, 0.5)]);
        state.transform(&mut other).unwrap();
        let mut vector = vec![0.0; FEATURE_COUNT];
        vector[TIME_INDEX] = 99.0;
        state.transform_vector(&mut vector).unwrap();

        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_transform_rejects_non_finite() {
        let train = matrix_with_time_amount(&[(1.0, 1.0), (2.0, 2.0)]);
        let state = ScalerState::fit(&train);

        let mut vector = vec![0.0; FEATURE_COUNT];
        vector[AMOUNT_INDEX] = f64::NAN;
        let err = state.transform_vector(&mut vector).unwrap_err();
        assert!(matches!(err, PipelineError::PreprocessingError(_)));
    }

    #[test]
    fn test_stratified_split_preserves_proportions() {
        let n = 100;
        let features = Array2::<f64>::zeros((n, FEATURE_COUNT));
        // 10% minority.
        let labels: Vec<u8> = (0..n).map(|i| u8::from(i % 10 == 0)).collect();

        let split = stratified_split(&features, &labels, 0.2, 42).unwrap();
        assert_eq!(split.train_y.len() + split.test_y.len(), n);

        let train_minority = split.train_y.iter().filter(|&&y| y == 1).count();
        let test_minority = split.test_y.iter().filter(|&&y| y == 1).count();
        assert_eq!(train_minority, 8);
        assert_eq!(test_minority, 2);
    }

    #[test]
    fn test_stratified_split_is_reproducible() {
        let n = 50;
        let features =
            Array2::from_shape_fn((n, FEATURE_COUNT), |(i, j)| (i * FEATURE_COUNT + j) as f64);
        let labels: Vec<u8> = (0..n).map(|i| u8::from(i % 5 == 0)).collect();

        let a = stratified_split(&features, &labels, 0.2, 7).unwrap();
        let b = stratified_split(&features, &labels, 0.2, 7).unwrap();
        assert_eq!(a.train_y, b.train_y);
        assert_eq!(a.train_x, b.train_x);
        assert_eq!(a.test_x, b.test_x);
    }

    #[test]
    fn test_stratified_split_rejects_bad_fraction() {
        let features = Array2::<f64>::zeros((10, FEATURE_COUNT));
        let labels = vec![0u8; 10];
        assert!(stratified_split(&features, &labels, 0.0, 1).is_err());
        assert!(stratified_split(&features, &labels, 1.0, 1).is_err());
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.5), 2.5);
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
    }
}
