//! Configuration management for the fraud model lifecycle service.

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub artifacts: ArtifactsConfig,
    pub training: TrainingConfig,
    pub drift: DriftConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Input data locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Labeled training dataset (CSV with header V1..V28, Time, Amount, Class).
    pub training_data: String,
    /// Incoming batch checked for drift against the training baseline.
    pub drift_batch: String,
}

/// Persisted artifact location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Directory holding the model, scaler, and baseline statistics.
    pub dir: String,
}

/// Training run parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Seed for the stratified split, resampling, and bagged-tree bootstrap.
    pub seed: u64,
    /// Fraction of rows held out for evaluation.
    pub test_fraction: f64,
    /// Target minority/majority ratio after resampling (1.0 = full balance).
    pub resample_ratio: f64,
}

/// Drift detection parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// z-score above which a feature counts as drifted.
    pub z_threshold: f64,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl AppConfig {
    /// Load configuration from the well-known path.
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            artifacts: ArtifactsConfig::default(),
            training: TrainingConfig::default(),
            drift: DriftConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            training_data: "data/raw/creditcard.csv".to_string(),
            drift_batch: "data/raw/new_batch.csv".to_string(),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: "models/saved".to_string(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            resample_ratio: 1.0,
        }
    }
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self { z_threshold: 3.0 }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
