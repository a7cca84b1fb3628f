//! Error taxonomy for the model lifecycle pipeline.
//!
//! Variants are grouped by how callers recover: input-fixable errors
//! (`SchemaError`, `PreprocessingError`), not-yet-trained states
//! (`ArtifactMissing`, `BaselineMissing`, `ModelUnavailable`), and terminal
//! run failures (`DataUnavailable`). Nothing here is retried automatically.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the training pipeline, artifact store, and serving core.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input dataset missing or unreadable. Fatal for the training run.
    #[error("dataset unavailable at {path}: {reason}")]
    DataUnavailable { path: PathBuf, reason: String },

    /// One of the three persisted artifacts is absent. Equivalent to
    /// "not trained yet"; recover by running a training pass.
    #[error("artifact missing: {0} (train a model first)")]
    ArtifactMissing(String),

    /// No baseline statistics exist for drift comparison.
    #[error("baseline statistics not found (train a model first)")]
    BaselineMissing,

    /// The drift batch source could not be loaded.
    #[error("drift batch unreadable at {path}: {reason}")]
    BatchUnreadable { path: PathBuf, reason: String },

    /// A prediction request does not match the fixed 30-feature schema.
    #[error("schema violation: {0}")]
    SchemaError(String),

    /// The serving process has no model loaded. Distinct from a schema
    /// failure so clients know to retry later instead of fixing input.
    #[error("no model loaded")]
    ModelUnavailable,

    /// Scaler transform failure on malformed numeric input.
    #[error("preprocessing failed: {0}")]
    PreprocessingError(String),

    /// Unexpected failure inside the model's inference call.
    #[error("prediction failed: {0}")]
    PredictionError(String),

    /// Artifact store I/O or decode failure outside the missing case.
    #[error("artifact store error: {0}")]
    ArtifactStore(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_detail() {
        let err = PipelineError::SchemaError("missing field V17".to_string());
        assert!(err.to_string().contains("V17"));

        let err = PipelineError::ArtifactMissing("model.bin".to_string());
        assert!(err.to_string().contains("model.bin"));
    }

    #[test]
    fn test_model_unavailable_is_distinct_from_schema_error() {
        let unavailable = PipelineError::ModelUnavailable;
        let schema = PipelineError::SchemaError("bad field".to_string());

        assert!(matches!(unavailable, PipelineError::ModelUnavailable));
        assert!(!matches!(schema, PipelineError::ModelUnavailable));
    }
}
