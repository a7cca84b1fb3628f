//! CSV ingestion for labeled training data and unlabeled drift batches.
//!
//! Columns are looked up by header name and emitted in canonical order, so
//! the on-disk column order never leaks into the feature pipeline.

use crate::error::{PipelineError, Result};
use crate::types::transaction::{FEATURE_COLUMNS, LABEL_COLUMN};
use std::path::Path;

/// Labeled rows as read from disk, before cleaning. Missing or unparseable
/// cells are `None` and are imputed by the feature pipeline.
#[derive(Debug, Clone)]
pub struct RawDataset {
    /// Row-major feature values in canonical column order.
    pub features: Vec<Vec<Option<f64>>>,
    /// Binary labels aligned with `features`.
    pub labels: Vec<u8>,
}

impl RawDataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// An unlabeled batch in column-major form, used for drift checks.
///
/// Only canonical columns present in the file header are kept; cells that do
/// not parse as numbers are skipped rather than imputed, since drift
/// compares summary statistics, not individual rows.
#[derive(Debug, Clone, Default)]
pub struct BatchColumns {
    columns: Vec<(String, Vec<f64>)>,
}

impl BatchColumns {
    pub fn new(columns: Vec<(String, Vec<f64>)>) -> Self {
        Self { columns }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Vec<f64>> {
        self.columns
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Load the labeled training dataset.
///
/// The header must contain every canonical feature column plus `Class`.
/// Fails with `DataUnavailable`; a missing file is terminal for the run.
pub fn load_training<P: AsRef<Path>>(path: P) -> Result<RawDataset> {
    let path = path.as_ref();
    let data_err = |reason: String| PipelineError::DataUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| data_err(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| data_err(e.to_string()))?
        .clone();

    let feature_positions = canonical_positions(&headers)
        .map_err(|missing| data_err(format!("missing column {}", missing)))?;
    let label_position = headers
        .iter()
        .position(|h| h.trim() == LABEL_COLUMN)
        .ok_or_else(|| data_err(format!("missing column {}", LABEL_COLUMN)))?;

    let mut features = Vec::new();
    let mut labels = Vec::new();

    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| data_err(e.to_string()))?;

        let row: Vec<Option<f64>> = feature_positions
            .iter()
            .map(|&pos| parse_cell(record.get(pos)))
            .collect();

        let label_cell = record.get(label_position).unwrap_or("").trim();
        let label = label_cell
            .parse::<f64>()
            .map_err(|_| data_err(format!("row {}: unparseable label {:?}", row_idx + 1, label_cell)))?;

        features.push(row);
        labels.push(if label != 0.0 { 1 } else { 0 });
    }

    if features.is_empty() {
        return Err(data_err("no data rows".to_string()));
    }

    Ok(RawDataset { features, labels })
}

/// Load an unlabeled batch for drift checking.
///
/// Fails with `BatchUnreadable`; absent canonical columns are simply not
/// reported on, matching the by-name intersection in the drift contract.
pub fn load_batch<P: AsRef<Path>>(path: P) -> Result<BatchColumns> {
    let path = path.as_ref();
    let batch_err = |reason: String| PipelineError::BatchUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| batch_err(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| batch_err(e.to_string()))?
        .clone();

    // Canonical columns present in this file, in canonical order.
    let present: Vec<(String, usize)> = FEATURE_COLUMNS
        .iter()
        .filter_map(|&name| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .map(|pos| (name.to_string(), pos))
        })
        .collect();

    if present.is_empty() {
        return Err(batch_err("no canonical feature columns in header".to_string()));
    }

    let mut columns: Vec<(String, Vec<f64>)> =
        present.iter().map(|(name, _)| (name.clone(), Vec::new())).collect();

    for record in reader.records() {
        let record = record.map_err(|e| batch_err(e.to_string()))?;
        for ((_, pos), (_, values)) in present.iter().zip(columns.iter_mut()) {
            if let Some(value) = parse_cell(record.get(*pos)) {
                values.push(value);
            }
        }
    }

    Ok(BatchColumns::new(columns))
}

/// Header position of every canonical column, or the first missing name.
fn canonical_positions(headers: &csv::StringRecord) -> std::result::Result<Vec<usize>, &'static str> {
    FEATURE_COLUMNS
        .iter()
        .map(|&name| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(name)
        })
        .collect()
}

fn parse_cell(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::{AMOUNT_INDEX, FEATURE_COUNT, TIME_INDEX};
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn header(with_class: bool) -> String {
        let mut cols: Vec<String> = FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect();
        if with_class {
            cols.push("Class".to_string());
        }
        cols.join(",")
    }

    fn row(value: f64, class: Option<u8>) -> String {
        let mut cells: Vec<String> = (0..FEATURE_COUNT).map(|_| value.to_string()).collect();
        if let Some(class) = class {
            cells.push(class.to_string());
        }
        cells.join(",")
    }

    #[test]
    fn test_load_training_canonical_order() {
        let contents = format!("{}\n{}\n{}\n", header(true), row(1.0, Some(0)), row(2.0, Some(1)));
        let file = write_csv(&contents);

        let dataset = load_training(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.labels, vec![0, 1]);
        assert_eq!(dataset.features[0][TIME_INDEX], Some(1.0));
        assert_eq!(dataset.features[1][AMOUNT_INDEX], Some(2.0));
    }

    #[test]
    fn test_load_training_missing_cells_are_none() {
        let mut cells: Vec<String> = (0..FEATURE_COUNT).map(|_| "1.5".to_string()).collect();
        cells[3] = String::new();
        cells.push("0".to_string());
        let contents = format!("{}\n{}\n", header(true), cells.join(","));
        let file = write_csv(&contents);

        let dataset = load_training(file.path()).unwrap();
        assert_eq!(dataset.features[0][3], None);
        assert_eq!(dataset.features[0][4], Some(1.5));
    }

    #[test]
    fn test_load_training_missing_column_fails() {
        // Header without the Class column.
        let contents = format!("{}\n{}\n", header(false), row(1.0, None));
        let file = write_csv(&contents);

        let err = load_training(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable { .. }));
        assert!(err.to_string().contains("Class"));
    }

    #[test]
    fn test_load_training_missing_file() {
        let err = load_training("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable { .. }));
    }

    #[test]
    fn test_load_batch_subset_of_columns() {
        let contents = "V1,V2,Extra\n1.0,2.0,9.9\n3.0,4.0,9.9\n";
        let file = write_csv(contents);

        let batch = load_batch(file.path()).unwrap();
        let columns: Vec<(&str, &[f64])> = batch.iter().collect();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].0, "V1");
        assert_eq!(columns[0].1, &[1.0, 3.0]);
        assert_eq!(columns[1].1, &[2.0, 4.0]);
    }

    #[test]
    fn test_load_batch_missing_file() {
        let err = load_batch("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, PipelineError::BatchUnreadable { .. }));
    }
}
