//! HTTP API for aid predictions, health checks, and Prometheus metrics

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use prometheus::{Encoder, TextEncoder};
use relief_lib::{
    HealthResponse, ModelRegistry, PredictError, PredictRequest, PredictResponse,
    PredictionEngine, ServiceMetrics, StructuredLogger,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub engine: PredictionEngine,
    pub metrics: ServiceMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(registry: Arc<ModelRegistry>, metrics: ServiceMetrics, logger: StructuredLogger) -> Self {
        let engine = PredictionEngine::new(registry.clone());
        Self {
            registry,
            engine,
            metrics,
            logger,
        }
    }
}

/// Error body matching the service's client-facing error shape
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Health check - returns 200 with the registry state when all models are
/// loaded, 503 otherwise
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = HealthResponse::from_registry(&state.registry);
    let status_code = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(health))
}

/// Generate aid predictions for a region
async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> axum::response::Response {
    let start = Instant::now();

    match state.engine.predict(&request) {
        Ok(data) => {
            state
                .metrics
                .observe_prediction_latency(start.elapsed().as_secs_f64());
            state.metrics.inc_predictions_generated();
            state.logger.log_prediction(
                &data.region_id,
                data.confidence,
                &data.prediction_hash,
                data.predictions.len(),
            );
            let response = PredictResponse {
                success: true,
                data,
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err @ PredictError::NotReady) => {
            state.metrics.inc_prediction_errors();
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody {
                    detail: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Permissive CORS for the prototype frontend; restrict in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/metrics", get(metrics))
        .layer(cors)
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
