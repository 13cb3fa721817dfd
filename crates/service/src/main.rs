//! Relief Service - Post-earthquake aid quantity prediction
//!
//! Loads trained per-aid-type regression models once at startup, then
//! serves predictions over HTTP. Model loading failures degrade the
//! health surface instead of crashing the process.

use anyhow::Result;
use relief_lib::{ModelRegistry, ServiceMetrics, StructuredLogger, SERVICE_NAME};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting relief-service");

    // Load configuration
    let config = config::ServiceConfig::load()?;
    info!(model_dir = %config.model_dir.display(), api_port = config.api_port, "Service configured");

    // Load models once, before serving; the registry is read-only afterwards
    let registry = Arc::new(ModelRegistry::load(&config.model_dir));

    // Initialize metrics
    let metrics = ServiceMetrics::new();
    metrics.set_models_loaded(registry.model_count() as i64);

    // Initialize structured logger
    let logger = StructuredLogger::new(SERVICE_NAME);
    logger.log_startup(SERVICE_VERSION, registry.model_count());

    // Create shared application state
    let app_state = Arc::new(api::AppState::new(registry, metrics, logger.clone()));

    // Start the prediction API server
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    info!("Shutting down");
    api_handle.abort();

    Ok(())
}
