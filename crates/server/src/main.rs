//! Insurance Predictor - form server for medical insurance cost estimates
//!
//! Loads the trained estimator once at startup and refuses to start when the
//! artifact is missing or unreadable.

use anyhow::{Context, Result};
use insurance_server::{api, config::ServerConfig};
use predictor_lib::{
    health::{components, HealthRegistry},
    load_model, PredictionAdapter, PredictorMetrics, StructuredLogger,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = ServerConfig::load()?;
    let encoding = config.encoding()?;

    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(SERVER_VERSION, &config.model_path.display().to_string());

    let health_registry = HealthRegistry::new();
    health_registry.register(components::PREDICTION_ADAPTER).await;

    let model = match load_model(&config.model_path, config.model_format) {
        Ok(model) => model,
        Err(e) => {
            logger.log_model_load_failed(&e);
            return Err(e).context("Startup aborted, no model to serve predictions with");
        }
    };
    logger.log_model_loaded(&model.info);

    let metrics = PredictorMetrics::new();
    metrics.set_model_info(&model.info);
    health_registry
        .mark_model_loaded(model.info.model_version.clone())
        .await;

    let adapter = PredictionAdapter::with_encoding(model.estimator, encoding);
    let app_state = Arc::new(api::AppState::new(
        adapter,
        health_registry,
        metrics,
        logger.clone(),
    ));

    api::serve(&config.listen_addr(), app_state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    })
    .await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
