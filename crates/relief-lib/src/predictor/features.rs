//! Feature vectorization for model inference
//!
//! Maps a validated request onto the fixed-order numeric vector the
//! models were trained on. Pure and deterministic; the vector is built
//! once per request and shared across every aid type's model.

use crate::models::{FeatureVector, PredictRequest};

/// Build the model input vector from a request.
pub fn vectorize(request: &PredictRequest) -> FeatureVector {
    FeatureVector {
        collapsed_buildings: request.collapsed_buildings as f64,
        urgent_demolition: request.urgent_demolition as f64,
        severely_damaged: request.severely_damaged as f64,
        moderately_damaged: request.moderately_damaged as f64,
        population: request.population as f64,
        population_change: request.population_change as f64,
        max_magnitude: request.max_magnitude,
        earthquake_count: request.earthquake_count as f64,
        damage_ratio: request.damage_ratio,
    }
}
