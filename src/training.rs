//! Candidate training, selection, and the end-to-end training run.
//!
//! The run is a single-threaded batch job: load, clean, split, scale
//! (fit on train only), resample the training split, fit the fixed candidate
//! lineup, score on the untouched test split, pick the winner by F1, capture
//! the baseline, and hand everything to the artifact store.

use crate::artifacts::{ArtifactStore, SavedModel};
use crate::baseline::BaselineStats;
use crate::config::AppConfig;
use crate::data;
use crate::evaluation::{self, EvalMetrics};
use crate::models::{Classifier, GradientBoosting, LogisticRegression, RandomForest};
use crate::preprocessing;
use crate::resample;
use crate::types::transaction::FEATURE_COLUMNS;
use chrono::Utc;
use ndarray::Array2;
use tracing::info;

/// A fitted candidate with its held-out scores.
pub struct TrainedCandidate {
    pub name: &'static str,
    pub model: Classifier,
    pub metrics: EvalMetrics,
}

/// Outcome of a completed training run.
pub struct TrainingSummary {
    pub selected: String,
    pub metrics: EvalMetrics,
    pub candidates: Vec<(String, EvalMetrics)>,
}

/// Fit the fixed candidate lineup on the resampled training set, in
/// declaration order. The order matters: it is the selection tie-break.
pub fn train_candidates(x: &Array2<f64>, y: &[u8], seed: u64) -> Vec<(&'static str, Classifier)> {
    let mut candidates: Vec<(&'static str, Classifier)> = Vec::with_capacity(3);

    info!(model = "logistic_regression", "Training candidate");
    candidates.push((
        "logistic_regression",
        Classifier::LogisticRegression(LogisticRegression::fit(x, y)),
    ));

    info!(model = "random_forest", "Training candidate");
    candidates.push((
        "random_forest",
        Classifier::RandomForest(RandomForest::fit(x, y, seed)),
    ));

    info!(model = "gradient_boosting", "Training candidate");
    candidates.push((
        "gradient_boosting",
        Classifier::GradientBoosting(GradientBoosting::fit(x, y, seed)),
    ));

    candidates
}

/// Score a candidate on the held-out (unresampled) test partition.
pub fn evaluate(model: &Classifier, x_test: &Array2<f64>, y_test: &[u8]) -> EvalMetrics {
    evaluation::evaluate(&model.predict_probabilities(x_test), y_test)
}

/// Highest F1 wins. An exact tie keeps the earlier candidate: first-trained
/// wins is the explicit policy, so selection is stable across runs.
pub fn select_best(candidates: Vec<TrainedCandidate>) -> Option<TrainedCandidate> {
    let mut best: Option<TrainedCandidate> = None;
    for candidate in candidates {
        let improves = match &best {
            Some(current) => candidate.metrics.f1 > current.metrics.f1,
            None => true,
        };
        if improves {
            best = Some(candidate);
        }
    }
    best
}

/// Run the whole pipeline and persist the three artifacts.
pub fn run(config: &AppConfig) -> anyhow::Result<TrainingSummary> {
    info!(path = %config.data.training_data, "Loading training data");
    let raw = data::load_training(&config.data.training_data)?;
    let (features, labels) = preprocessing::clean(&raw);
    info!(
        rows = features.nrows(),
        positives = labels.iter().filter(|&&y| y == 1).count(),
        "Dataset cleaned"
    );

    let mut split = preprocessing::stratified_split(
        &features,
        &labels,
        config.training.test_fraction,
        config.training.seed,
    )?;

    // Scaler is fit on the training split only and applied read-only to the
    // test split.
    let scaler = preprocessing::fit_scale(&mut split.train_x)?;
    scaler.transform(&mut split.test_x)?;

    let (train_x, train_y) = resample::resample(
        &split.train_x,
        &split.train_y,
        config.training.resample_ratio,
        config.training.seed,
    )?;
    info!(
        train_rows = train_x.nrows(),
        test_rows = split.test_x.nrows(),
        "Training set resampled"
    );

    let mut evaluated = Vec::new();
    for (name, model) in train_candidates(&train_x, &train_y, config.training.seed) {
        let metrics = evaluate(&model, &split.test_x, &split.test_y);
        info!(
            model = name,
            f1 = metrics.f1,
            roc_auc = metrics.roc_auc,
            pr_auc = metrics.pr_auc,
            "Candidate evaluated"
        );
        evaluated.push(TrainedCandidate {
            name,
            model,
            metrics,
        });
    }

    let candidate_metrics: Vec<(String, EvalMetrics)> = evaluated
        .iter()
        .map(|c| (c.name.to_string(), c.metrics))
        .collect();

    let best = select_best(evaluated)
        .ok_or_else(|| anyhow::anyhow!("no candidates were trained"))?;
    info!(model = best.name, f1 = best.metrics.f1, "Best model selected");

    // Baseline over the exact matrix the winner trained on.
    let feature_names: Vec<&str> = FEATURE_COLUMNS.to_vec();
    let baseline = BaselineStats::capture(&train_x, &feature_names);

    let saved = SavedModel {
        name: best.name.to_string(),
        feature_names: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        trained_at: Utc::now(),
        model: best.model,
    };

    let store = ArtifactStore::new(&config.artifacts.dir);
    store.save(&saved, &scaler, &baseline)?;

    Ok(TrainingSummary {
        selected: saved.name,
        metrics: best.metrics,
        candidates: candidate_metrics,
    })
}
