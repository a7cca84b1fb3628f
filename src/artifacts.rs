//! Persistence for the trained model, scaler state, and baseline statistics.
//!
//! The store owns a fixed, well-known directory with three artifacts. Writes
//! stage to temporary files first and rename into place, so readers never
//! observe a half-written artifact. A store with any artifact absent is
//! treated as "not trained yet."

use crate::baseline::BaselineStats;
use crate::error::{PipelineError, Result};
use crate::models::Classifier;
use crate::preprocessing::ScalerState;
use crate::types::transaction::FEATURE_COLUMNS;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MODEL_FILE: &str = "model.bin";
pub const SCALER_FILE: &str = "scaler.bin";
pub const BASELINE_FILE: &str = "baseline_stats.json";

/// The selected classifier plus the schema it was trained against.
///
/// Persisting the feature names alongside the model makes the column-order
/// contract explicit instead of trusting two code paths to agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedModel {
    /// Candidate name, e.g. `random_forest`.
    pub name: String,
    /// Feature schema, canonical order.
    pub feature_names: Vec<String>,
    pub trained_at: DateTime<Utc>,
    pub model: Classifier,
}

/// Store rooted at a fixed directory; overwritten by each training run.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist all three artifacts. Everything is staged before anything is
    /// renamed into place.
    pub fn save(
        &self,
        model: &SavedModel,
        scaler: &ScalerState,
        baseline: &BaselineStats,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| PipelineError::ArtifactStore(format!("create {:?}: {}", self.dir, e)))?;

        let model_bytes = bincode::serialize(model)
            .map_err(|e| PipelineError::ArtifactStore(format!("encode model: {}", e)))?;
        let scaler_bytes = bincode::serialize(scaler)
            .map_err(|e| PipelineError::ArtifactStore(format!("encode scaler: {}", e)))?;
        let baseline_bytes = serde_json::to_vec_pretty(baseline)
            .map_err(|e| PipelineError::ArtifactStore(format!("encode baseline: {}", e)))?;

        let staged = [
            (MODEL_FILE, model_bytes),
            (SCALER_FILE, scaler_bytes),
            (BASELINE_FILE, baseline_bytes),
        ];

        for (name, bytes) in &staged {
            let tmp = self.dir.join(format!("{}.tmp", name));
            fs::write(&tmp, bytes)
                .map_err(|e| PipelineError::ArtifactStore(format!("stage {}: {}", name, e)))?;
        }
        for (name, _) in &staged {
            let tmp = self.dir.join(format!("{}.tmp", name));
            fs::rename(&tmp, self.dir.join(name))
                .map_err(|e| PipelineError::ArtifactStore(format!("commit {}: {}", name, e)))?;
        }

        info!(
            dir = %self.dir.display(),
            model = %model.name,
            "Artifacts saved"
        );
        Ok(())
    }

    /// Load all three artifacts. Any absent artifact means "not trained
    /// yet" and fails with `ArtifactMissing`.
    pub fn load(&self) -> Result<(SavedModel, ScalerState, BaselineStats)> {
        let model_bytes = self.read_artifact(MODEL_FILE)?;
        let scaler_bytes = self.read_artifact(SCALER_FILE)?;
        let baseline_bytes = self.read_artifact(BASELINE_FILE)?;

        let model: SavedModel = bincode::deserialize(&model_bytes)
            .map_err(|e| PipelineError::ArtifactStore(format!("decode {}: {}", MODEL_FILE, e)))?;
        let scaler: ScalerState = bincode::deserialize(&scaler_bytes)
            .map_err(|e| PipelineError::ArtifactStore(format!("decode {}: {}", SCALER_FILE, e)))?;
        let baseline: BaselineStats = serde_json::from_slice(&baseline_bytes)
            .map_err(|e| PipelineError::ArtifactStore(format!("decode {}: {}", BASELINE_FILE, e)))?;

        if model.feature_names != FEATURE_COLUMNS {
            return Err(PipelineError::ArtifactStore(
                "stored model feature schema does not match the canonical feature order".to_string(),
            ));
        }

        info!(
            model = %model.name,
            trained_at = %model.trained_at,
            "Artifacts loaded"
        );
        Ok((model, scaler, baseline))
    }

    fn read_artifact(&self, name: &str) -> Result<Vec<u8>> {
        match fs::read(self.dir.join(name)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(PipelineError::ArtifactMissing(name.to_string()))
            }
            Err(e) => Err(PipelineError::ArtifactStore(format!("read {}: {}", name, e))),
        }
    }
}
