//! HTTP surface: prediction, drift checks, and health.
//!
//! Thin handlers over the core: schema validation happens at extraction,
//! core errors map to status codes here, and all state is an immutable
//! snapshot loaded once at startup.

use crate::artifacts::ArtifactStore;
use crate::baseline::BaselineStats;
use crate::config::AppConfig;
use crate::data;
use crate::drift;
use crate::error::{PipelineError, Result};
use crate::metrics::ServingMetrics;
use crate::predictor::Predictor;
use crate::preprocessing::ScalerState;
use crate::types::report::{DriftReport, Prediction};
use crate::types::transaction::TransactionRecord;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

/// Artifacts loaded once at startup. Absent means "not trained yet": the
/// service stays up but answers 503 on predictions.
pub struct LoadedArtifacts {
    pub predictor: Predictor,
    pub scaler: ScalerState,
    pub baseline: BaselineStats,
}

/// Shared, read-only request state.
pub struct AppState {
    pub artifacts: Option<Arc<LoadedArtifacts>>,
    pub config: AppConfig,
    pub metrics: Arc<ServingMetrics>,
}

pub type SharedState = Arc<AppState>;

/// Load artifacts and assemble the shared state. A failed load logs and
/// degrades to not-ready instead of crashing the process.
pub fn build_state(config: AppConfig, metrics: Arc<ServingMetrics>) -> SharedState {
    let store = ArtifactStore::new(&config.artifacts.dir);
    let artifacts = match store.load() {
        Ok((model, scaler, baseline)) => Some(Arc::new(LoadedArtifacts {
            predictor: Predictor::new(model, scaler.clone()),
            scaler,
            baseline,
        })),
        Err(e) => {
            warn!(error = %e, "Artifacts not loaded; serving degraded to not-ready");
            None
        }
    };

    Arc::new(AppState {
        artifacts,
        config,
        metrics,
    })
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/drift", get(drift_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = match &self {
            PipelineError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            PipelineError::SchemaError(_) | PipelineError::PreprocessingError(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn predict_handler(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<TransactionRecord>, JsonRejection>,
) -> std::result::Result<Json<Prediction>, PipelineError> {
    let start = Instant::now();

    // Schema validation fails here, before any artifact access or model work.
    let Json(record) =
        payload.map_err(|rejection| PipelineError::SchemaError(rejection.body_text()))?;

    let artifacts = state
        .artifacts
        .as_ref()
        .ok_or(PipelineError::ModelUnavailable)?;

    let prediction = artifacts.predictor.predict(&record).map_err(|e| {
        error!(error = %e, "Prediction failed");
        e
    })?;

    state
        .metrics
        .record_prediction(start.elapsed(), prediction.probability, prediction.is_fraud);

    Ok(Json(prediction))
}

async fn drift_handler(State(state): State<SharedState>) -> Json<serde_json::Value> {
    match run_drift_check(&state) {
        Ok(report) => match serde_json::to_value(&report) {
            Ok(value) => Json(value),
            Err(e) => Json(json!({ "error": e.to_string() })),
        },
        Err(e) => {
            warn!(error = %e, "Drift check failed");
            Json(json!({ "error": e.to_string() }))
        }
    }
}

fn run_drift_check(state: &AppState) -> Result<DriftReport> {
    let artifacts = state
        .artifacts
        .as_ref()
        .ok_or(PipelineError::BaselineMissing)?;

    let mut batch = data::load_batch(&state.config.data.drift_batch)?;

    // Bring the batch into the baseline's feature space: the baseline was
    // captured over scaled training features, so the scaled columns get the
    // stored transform before comparison.
    for column in ["Time", "Amount"] {
        if let (Some(values), Some(scale)) =
            (batch.column_mut(column), artifacts.scaler.scale_for(column))
        {
            for value in values.iter_mut() {
                *value = scale.transform(*value);
            }
        }
    }

    Ok(drift::check(
        &batch,
        &artifacts.baseline,
        state.config.drift.z_threshold,
    ))
}

async fn health_handler(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "model_loaded": state.artifacts.is_some(),
    }))
}
