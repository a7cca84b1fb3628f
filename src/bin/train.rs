//! Training entry point.
//!
//! Consumes the labeled dataset at the configured path and produces the
//! three serving artifacts: model, scaler state, and baseline statistics.
//! A missing input file is terminal for the run; nothing is retried.

use anyhow::Result;
use fraud_model_service::{config::AppConfig, training};
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fraud_model_service=info".parse()?)
                .add_directive("train=info".parse()?),
        )
        .init();

    info!("Starting training run");

    let config = AppConfig::load()?;
    let summary = training::run(&config)?;

    for (name, metrics) in &summary.candidates {
        info!(
            model = %name,
            f1 = format!("{:.4}", metrics.f1),
            roc_auc = format!("{:.4}", metrics.roc_auc),
            pr_auc = format!("{:.4}", metrics.pr_auc),
            "Candidate results"
        );
    }
    info!(
        model = %summary.selected,
        f1 = format!("{:.4}", summary.metrics.f1),
        "Training run complete, artifacts saved"
    );

    Ok(())
}
