//! Fraud Model Service - Prediction API Entry Point
//!
//! Loads the trained artifacts, then serves predictions, drift checks, and
//! health over HTTP. If no artifacts exist yet the service starts degraded
//! and answers 503 on predictions until a training run completes.

use anyhow::Result;
use fraud_model_service::{
    config::AppConfig,
    metrics::{MetricsReporter, ServingMetrics},
    server,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fraud_model_service=info".parse()?),
        )
        .init();

    info!("Starting fraud model service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Initialize metrics
    let metrics = Arc::new(ServingMetrics::new());

    // Load artifacts into the shared request state
    let state = server::build_state(config.clone(), metrics.clone());
    match &state.artifacts {
        Some(artifacts) => info!(
            model = artifacts.predictor.model_name(),
            "Model, scaler, and baseline loaded"
        ),
        None => warn!("No trained artifacts found; run a training pass, then restart"),
    }

    // Start metrics reporter (prints a summary every 30 seconds)
    let reporter_metrics = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(reporter_metrics, 30);
        reporter.start().await;
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Listening for requests");

    axum::serve(listener, server::router(state)).await?;

    Ok(())
}
