//! Error types for model loading and prediction

use thiserror::Error;

use crate::models::NUM_FEATURES;

/// Failures while loading a model artifact from disk.
///
/// These are contained by the registry: a failed artifact leaves its aid
/// type absent and degrades readiness instead of aborting the load.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed forest artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("artifact declares {got} features, models are trained on {NUM_FEATURES}")]
    FeatureMismatch { got: usize },

    #[error("forest artifact contains no trees")]
    EmptyForest,

    #[error("failed to load onnx artifact: {0}")]
    Onnx(String),
}

/// Failures surfaced to callers of the prediction engine.
///
/// Per-model inference failures never appear here; the engine degrades
/// the failing aid type to zero and completes the request.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("models are not loaded")]
    NotReady,
}
