//! Core data models for the relief prediction service

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of input features expected by every trained model
pub const NUM_FEATURES: usize = 9;

/// The aid quantities the service predicts.
///
/// Variant order matches the lexicographic order of the serialized keys
/// (`blanket` < `container` < `food_package` < `tent`); result hashing
/// relies on this when serializing prediction maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AidType {
    Blanket,
    Container,
    FoodPackage,
    Tent,
}

impl AidType {
    pub const ALL: [AidType; 4] = [
        AidType::Blanket,
        AidType::Container,
        AidType::FoodPackage,
        AidType::Tent,
    ];

    /// Serialized key, also the stem of the artifact filename mapping.
    pub fn key(&self) -> &'static str {
        match self {
            AidType::Blanket => "blanket",
            AidType::Container => "container",
            AidType::FoodPackage => "food_package",
            AidType::Tent => "tent",
        }
    }
}

/// Damage and demographic indicators for one region.
///
/// `region_id` and `population` are required; the HTTP layer rejects
/// requests missing either before they reach the prediction engine.
/// Every other field defaults to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub region_id: String,
    #[serde(default)]
    pub collapsed_buildings: i64,
    #[serde(default)]
    pub urgent_demolition: i64,
    #[serde(default)]
    pub severely_damaged: i64,
    #[serde(default)]
    pub moderately_damaged: i64,
    pub population: i64,
    #[serde(default)]
    pub population_change: i64,
    #[serde(default)]
    pub max_magnitude: f64,
    #[serde(default)]
    pub earthquake_count: i64,
    #[serde(default)]
    pub damage_ratio: f64,
}

/// Feature vector for model inference.
///
/// Field order is the order the models were trained on; `as_array`
/// preserves it. Changing it silently breaks every prediction, so any
/// reordering must be paired with re-exported model artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub collapsed_buildings: f64,
    pub urgent_demolition: f64,
    pub severely_damaged: f64,
    pub moderately_damaged: f64,
    pub population: f64,
    pub population_change: f64,
    pub max_magnitude: f64,
    pub earthquake_count: f64,
    pub damage_ratio: f64,
}

impl FeatureVector {
    /// Flatten into the fixed training order.
    pub fn as_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.collapsed_buildings,
            self.urgent_demolition,
            self.severely_damaged,
            self.moderately_damaged,
            self.population,
            self.population_change,
            self.max_magnitude,
            self.earthquake_count,
            self.damage_ratio,
        ]
    }
}

/// Aggregated prediction output for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionData {
    /// Aid quantities, keyed by aid type; only types with a loaded model
    /// appear. Serializes with lexicographically sorted keys.
    pub predictions: BTreeMap<AidType, u64>,
    /// Mean per-model confidence in [0.5, 0.95], or 0.0 when no model
    /// produced a score. Rounded to 2 decimals.
    pub confidence: f64,
    /// SHA-256 content hash over the predictions and region id.
    pub prediction_hash: String,
    pub region_id: String,
}

/// Response envelope returned by `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    pub data: PredictionData,
    /// UTC generation time, RFC 3339 with a trailing `Z`.
    pub timestamp: String,
}
