//! Serving-time prediction over the loaded artifacts.
//!
//! Reproduces the training-time feature pipeline exactly: canonical
//! assembly, then the stored scaler applied to `Time`/`Amount` only, never
//! refit. The handle is immutable after construction, so concurrent
//! requests share it without locking.

use crate::artifacts::SavedModel;
use crate::error::{PipelineError, Result};
use crate::models::DECISION_THRESHOLD;
use crate::preprocessing::ScalerState;
use crate::types::report::Prediction;
use crate::types::transaction::TransactionRecord;
use ndarray::ArrayView1;
use tracing::debug;

/// One consistently-versioned snapshot of the model and scaler.
pub struct Predictor {
    model: SavedModel,
    scaler: ScalerState,
}

impl Predictor {
    pub fn new(model: SavedModel, scaler: ScalerState) -> Self {
        Self { model, scaler }
    }

    pub fn model_name(&self) -> &str {
        &self.model.name
    }

    /// Score one schema-validated record.
    pub fn predict(&self, record: &TransactionRecord) -> Result<Prediction> {
        let mut features = record.to_feature_vector();
        self.scaler.transform_vector(&mut features)?;

        let probability = self
            .model
            .model
            .predict_probability(ArrayView1::from(features.as_slice()));
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(PipelineError::PredictionError(format!(
                "model produced out-of-range probability {}",
                probability
            )));
        }

        let label = u8::from(probability >= DECISION_THRESHOLD);
        debug!(
            model = %self.model.name,
            probability = probability,
            label = label,
            "Transaction scored"
        );

        Ok(Prediction {
            prediction: label,
            probability,
            is_fraud: label == 1,
        })
    }
}
