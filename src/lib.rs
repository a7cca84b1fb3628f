//! Fraud Model Lifecycle Service
//!
//! Trains candidate classifiers on labeled transaction data, persists the
//! selected model with its scaler state and baseline feature statistics,
//! serves real-time predictions over the fixed 30-feature schema, and
//! monitors incoming batches for statistical drift against the baseline.

pub mod artifacts;
pub mod baseline;
pub mod config;
pub mod data;
pub mod drift;
pub mod error;
pub mod evaluation;
pub mod metrics;
pub mod models;
pub mod predictor;
pub mod preprocessing;
pub mod resample;
pub mod server;
pub mod training;
pub mod types;

pub use config::AppConfig;
pub use error::{PipelineError, Result};
pub use predictor::Predictor;
pub use types::{DriftReport, Prediction, TransactionRecord};
