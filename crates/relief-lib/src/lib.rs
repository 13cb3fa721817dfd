//! Library for post-earthquake aid quantity prediction
//!
//! This crate provides the core functionality for:
//! - Loading trained per-aid-type regression models into a registry
//! - Feature vectorization of damage/demographic indicators
//! - Per-model prediction with ensemble-based confidence estimation
//! - Deterministic content hashing of results
//! - Health checks and observability

pub mod error;
pub mod hash;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod registry;

pub use error::{ArtifactError, PredictError};
pub use health::{HealthResponse, ServiceStatus, SERVICE_NAME};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
pub use predictor::PredictionEngine;
pub use registry::{ModelRegistry, ReadinessState};
