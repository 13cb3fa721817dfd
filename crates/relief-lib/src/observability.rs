//! Observability infrastructure for the prediction service
//!
//! Provides:
//! - Prometheus metrics (prediction latency, request counters, model state)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_gauge, register_int_gauge_vec, Histogram, IntGauge,
    IntGaugeVec,
};
use std::sync::OnceLock;
use tracing::info;

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

struct ServiceMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_generated: IntGauge,
    prediction_errors: IntGauge,
    model_failures: IntGaugeVec,
    models_loaded: IntGauge,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "relief_service_prediction_latency_seconds",
                "Time spent generating aid predictions for a request",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_generated: register_int_gauge!(
                "relief_service_predictions_generated_total",
                "Total number of prediction requests served"
            )
            .expect("Failed to register predictions_generated"),

            prediction_errors: register_int_gauge!(
                "relief_service_prediction_errors_total",
                "Total number of prediction requests that failed"
            )
            .expect("Failed to register prediction_errors"),

            model_failures: register_int_gauge_vec!(
                "relief_service_model_failures_total",
                "Per-model inference failures degraded to zero predictions",
                &["aid_type"]
            )
            .expect("Failed to register model_failures"),

            models_loaded: register_int_gauge!(
                "relief_service_models_loaded",
                "Number of aid-type models currently loaded"
            )
            .expect("Failed to register models_loaded"),
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions_generated(&self) {
        self.inner().predictions_generated.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors.inc();
    }

    pub fn inc_model_failure(&self, aid_type: &str) {
        self.inner().model_failures.with_label_values(&[aid_type]).inc();
    }

    pub fn set_models_loaded(&self, count: i64) {
        self.inner().models_loaded.set(count);
    }
}

/// Structured logger for service lifecycle and prediction events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_startup(&self, version: &str, models_loaded: usize) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            models_loaded = models_loaded,
            "Service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_stopped",
            service = %self.service,
            reason = %reason,
            "Service stopped"
        );
    }

    pub fn log_prediction(
        &self,
        region_id: &str,
        confidence: f64,
        prediction_hash: &str,
        aid_types: usize,
    ) {
        info!(
            event = "prediction_generated",
            service = %self.service,
            region_id = %region_id,
            confidence = confidence,
            prediction_hash = %prediction_hash,
            aid_types = aid_types,
            "Generated aid prediction"
        );
    }
}
