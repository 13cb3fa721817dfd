//! Health reporting for the prediction service
//!
//! The health surface collapses registry readiness to a boolean: only a
//! fully loaded registry reports healthy; degraded and empty registries
//! report unavailable so orchestration keeps traffic away until all four
//! models are present.

use serde::{Deserialize, Serialize};

use crate::registry::{ModelRegistry, ReadinessState};

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "relief-ai";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unavailable,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub service: &'static str,
    pub state: ReadinessState,
    pub models_loaded: usize,
}

impl HealthResponse {
    pub fn from_registry(registry: &ModelRegistry) -> Self {
        let status = if registry.is_ready() {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unavailable
        };
        Self {
            status,
            service: SERVICE_NAME,
            state: registry.state(),
            models_loaded: registry.model_count(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}
