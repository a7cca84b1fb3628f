//! Transaction record schema shared by training and serving.
//!
//! The canonical feature order is defined once here and consumed by
//! ingestion, training, baseline capture, drift checks, and the prediction
//! path. Assembling features in any other order is a correctness bug, so no
//! other module hardcodes column positions.

use serde::{Deserialize, Serialize};

/// Canonical feature order: the 28 anonymized components, then `Time`, then
/// `Amount`. Index in this array == index in every feature vector.
pub const FEATURE_COLUMNS: [&str; 30] = [
    "V1", "V2", "V3", "V4", "V5", "V6", "V7", "V8", "V9", "V10", "V11", "V12", "V13", "V14",
    "V15", "V16", "V17", "V18", "V19", "V20", "V21", "V22", "V23", "V24", "V25", "V26", "V27",
    "V28", "Time", "Amount",
];

/// Number of features in the canonical vector.
pub const FEATURE_COUNT: usize = 30;

/// Position of the `Time` column in the canonical vector.
pub const TIME_INDEX: usize = 28;

/// Position of the `Amount` column in the canonical vector.
pub const AMOUNT_INDEX: usize = 29;

/// Column name of the training label.
pub const LABEL_COLUMN: &str = "Class";

/// A single transaction to be scored.
///
/// Deserialization is strict: every field is required and unknown fields are
/// rejected, so a malformed request fails schema validation before any
/// scaling or model work happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionRecord {
    #[serde(rename = "V1")]
    pub v1: f64,
    #[serde(rename = "V2")]
    pub v2: f64,
    #[serde(rename = "V3")]
    pub v3: f64,
    #[serde(rename = "V4")]
    pub v4: f64,
    #[serde(rename = "V5")]
    pub v5: f64,
    #[serde(rename = "V6")]
    pub v6: f64,
    #[serde(rename = "V7")]
    pub v7: f64,
    #[serde(rename = "V8")]
    pub v8: f64,
    #[serde(rename = "V9")]
    pub v9: f64,
    #[serde(rename = "V10")]
    pub v10: f64,
    #[serde(rename = "V11")]
    pub v11: f64,
    #[serde(rename = "V12")]
    pub v12: f64,
    #[serde(rename = "V13")]
    pub v13: f64,
    #[serde(rename = "V14")]
    pub v14: f64,
    #[serde(rename = "V15")]
    pub v15: f64,
    #[serde(rename = "V16")]
    pub v16: f64,
    #[serde(rename = "V17")]
    pub v17: f64,
    #[serde(rename = "V18")]
    pub v18: f64,
    #[serde(rename = "V19")]
    pub v19: f64,
    #[serde(rename = "V20")]
    pub v20: f64,
    #[serde(rename = "V21")]
    pub v21: f64,
    #[serde(rename = "V22")]
    pub v22: f64,
    #[serde(rename = "V23")]
    pub v23: f64,
    #[serde(rename = "V24")]
    pub v24: f64,
    #[serde(rename = "V25")]
    pub v25: f64,
    #[serde(rename = "V26")]
    pub v26: f64,
    #[serde(rename = "V27")]
    pub v27: f64,
    #[serde(rename = "V28")]
    pub v28: f64,

    /// Seconds elapsed between this transaction and the first in the dataset.
    #[serde(rename = "Time")]
    pub time: f64,

    /// Transaction amount.
    #[serde(rename = "Amount")]
    pub amount: f64,
}

impl TransactionRecord {
    /// Assemble the feature vector in canonical order.
    pub fn to_feature_vector(&self) -> Vec<f64> {
        vec![
            self.v1, self.v2, self.v3, self.v4, self.v5, self.v6, self.v7, self.v8, self.v9,
            self.v10, self.v11, self.v12, self.v13, self.v14, self.v15, self.v16, self.v17,
            self.v18, self.v19, self.v20, self.v21, self.v22, self.v23, self.v24, self.v25,
            self.v26, self.v27, self.v28, self.time, self.amount,
        ]
    }

    /// A record with every feature zeroed, useful as a test fixture.
    pub fn zeroed() -> Self {
        Self {
            v1: 0.0,
            v2: 0.0,
            v3: 0.0,
            v4: 0.0,
            v5: 0.0,
            v6: 0.0,
            v7: 0.0,
            v8: 0.0,
            v9: 0.0,
            v10: 0.0,
            v11: 0.0,
            v12: 0.0,
            v13: 0.0,
            v14: 0.0,
            v15: 0.0,
            v16: 0.0,
            v17: 0.0,
            v18: 0.0,
            v19: 0.0,
            v20: 0.0,
            v21: 0.0,
            v22: 0.0,
            v23: 0.0,
            v24: 0.0,
            v25: 0.0,
            v26: 0.0,
            v27: 0.0,
            v28: 0.0,
            time: 0.0,
            amount: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> serde_json::Value {
        let mut payload = serde_json::Map::new();
        for name in FEATURE_COLUMNS {
            payload.insert(name.to_string(), json!(0.5));
        }
        serde_json::Value::Object(payload)
    }

    #[test]
    fn test_feature_vector_follows_canonical_order() {
        let mut record = TransactionRecord::zeroed();
        record.v1 = 1.0;
        record.v17 = 17.0;
        record.time = 100.0;
        record.amount = 42.0;

        let features = record.to_feature_vector();
        assert_eq!(features.len(), FEATURE_COUNT);
        assert_eq!(features[0], 1.0);
        assert_eq!(features[16], 17.0);
        assert_eq!(features[TIME_INDEX], 100.0);
        assert_eq!(features[AMOUNT_INDEX], 42.0);
    }

    #[test]
    fn test_full_payload_deserializes() {
        let record: TransactionRecord = serde_json::from_value(full_payload()).unwrap();
        assert_eq!(record.v1, 0.5);
        assert_eq!(record.amount, 0.5);
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut payload = full_payload();
        payload.as_object_mut().unwrap().remove("V17");

        let result: Result<TransactionRecord, _> = serde_json::from_value(payload);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("V17"), "error should name the field: {}", err);
    }

    #[test]
    fn test_extra_field_rejected() {
        let mut payload = full_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("V29".to_string(), json!(1.0));

        let result: Result<TransactionRecord, _> = serde_json::from_value(payload);
        assert!(result.is_err());
    }

    #[test]
    fn test_mistyped_field_rejected() {
        let mut payload = full_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("Amount".to_string(), json!("a lot"));

        let result: Result<TransactionRecord, _> = serde_json::from_value(payload);
        assert!(result.is_err());
    }
}
