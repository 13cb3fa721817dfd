//! Prediction orchestration
//!
//! Runs every available aid-type model against one shared feature vector,
//! contains per-model failures, aggregates confidence, and attaches the
//! deterministic result hash.

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error};

use super::confidence;
use super::features::vectorize;
use super::model::TrainedModel;
use crate::error::PredictError;
use crate::hash::prediction_hash;
use crate::models::{AidType, FeatureVector, PredictRequest, PredictionData};
use crate::observability::ServiceMetrics;
use crate::registry::ModelRegistry;

/// Orchestrates per-aid-type prediction over a loaded registry.
#[derive(Clone)]
pub struct PredictionEngine {
    registry: Arc<ModelRegistry>,
    metrics: ServiceMetrics,
}

impl PredictionEngine {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            metrics: ServiceMetrics::new(),
        }
    }

    /// Predict aid quantities for one region.
    ///
    /// Fails only when the registry is not fully loaded; individual model
    /// failures degrade that aid type to zero and the request completes.
    pub fn predict(&self, request: &PredictRequest) -> Result<PredictionData, PredictError> {
        if !self.registry.is_ready() {
            return Err(PredictError::NotReady);
        }
        Ok(self.predict_unchecked(request))
    }

    /// Predict with whatever models are present, ignoring readiness.
    ///
    /// Readiness gating belongs to `predict`; a degraded registry can
    /// still produce predictions for the aid types it has models for.
    pub fn predict_unchecked(&self, request: &PredictRequest) -> PredictionData {
        let features = vectorize(request);

        let mut predictions: BTreeMap<AidType, u64> = BTreeMap::new();
        let mut confidence_sum = 0.0;
        let mut scored_models = 0usize;

        for aid_type in AidType::ALL {
            let Some(model) = self.registry.get(aid_type) else {
                continue;
            };
            match Self::predict_one(model, &features) {
                Ok((quantity, confidence)) => {
                    debug!(
                        aid_type = aid_type.key(),
                        quantity, confidence, "Model prediction"
                    );
                    predictions.insert(aid_type, quantity);
                    confidence_sum += confidence;
                    scored_models += 1;
                }
                Err(err) => {
                    error!(
                        aid_type = aid_type.key(),
                        error = format!("{err:#}"),
                        "Model prediction failed, recording zero"
                    );
                    self.metrics.inc_model_failure(aid_type.key());
                    predictions.insert(aid_type, 0);
                }
            }
        }

        let confidence = if scored_models > 0 {
            round2(confidence_sum / scored_models as f64)
        } else {
            0.0
        };
        let prediction_hash = prediction_hash(&predictions, &request.region_id);

        PredictionData {
            predictions,
            confidence,
            prediction_hash,
            region_id: request.region_id.clone(),
        }
    }

    /// Quantity and confidence for one model. An error anywhere in here
    /// marks the whole aid type as failed.
    fn predict_one(model: &TrainedModel, features: &FeatureVector) -> Result<(u64, f64)> {
        let raw = model.predict(features)?;
        let quantity = raw.round().max(0.0) as u64;
        let confidence = confidence::estimate(model, features)?;
        Ok((quantity, confidence))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::forest::{DecisionTree, ForestModel, TreeNode};
    use crate::registry::ModelRegistry;
    use std::fs;
    use std::path::Path;

    fn leaf_tree(value: f64) -> serde_json::Value {
        serde_json::json!({ "nodes": [{ "kind": "leaf", "value": value }] })
    }

    fn write_leaf_forest(dir: &Path, aid_type: AidType, leaves: &[f64]) {
        let artifact = serde_json::json!({
            "model_version": "test",
            "n_features": 9,
            "trees": leaves.iter().map(|v| leaf_tree(*v)).collect::<Vec<_>>(),
        });
        fs::write(
            dir.join(format!("{}_model.json", aid_type.key())),
            artifact.to_string(),
        )
        .unwrap();
    }

    fn full_registry(dir: &Path) -> Arc<ModelRegistry> {
        write_leaf_forest(dir, AidType::Tent, &[8.0, 10.0, 12.0]);
        write_leaf_forest(dir, AidType::Container, &[50.0, 50.0, 50.0]);
        write_leaf_forest(dir, AidType::FoodPackage, &[900.0, 900.0, 900.0]);
        write_leaf_forest(dir, AidType::Blanket, &[0.0, 0.0, 0.0]);
        Arc::new(ModelRegistry::load(dir))
    }

    fn request() -> PredictRequest {
        PredictRequest {
            region_id: "tr-46".to_string(),
            collapsed_buildings: 5000,
            urgent_demolition: 2000,
            severely_damaged: 15000,
            moderately_damaged: 5000,
            population: 800_000,
            population_change: -50_000,
            max_magnitude: 7.2,
            earthquake_count: 500,
            damage_ratio: 0.25,
        }
    }

    #[test]
    fn predicts_every_loaded_aid_type() {
        let dir = tempfile::tempdir().unwrap();
        let engine = PredictionEngine::new(full_registry(dir.path()));
        let data = engine.predict(&request()).unwrap();

        assert_eq!(data.predictions.len(), 4);
        assert_eq!(data.predictions[&AidType::Tent], 10);
        assert_eq!(data.predictions[&AidType::Container], 50);
        assert_eq!(data.predictions[&AidType::FoodPackage], 900);
        assert_eq!(data.predictions[&AidType::Blanket], 0);
        assert_eq!(data.region_id, "tr-46");
        assert_eq!(data.prediction_hash.len(), 64);
    }

    #[test]
    fn overall_confidence_is_rounded_mean() {
        let dir = tempfile::tempdir().unwrap();
        let engine = PredictionEngine::new(full_registry(dir.path()));
        let data = engine.predict(&request()).unwrap();

        // tent spread ~0.8367, two zero-spread forests clamp to 0.95,
        // blanket's zero mean falls back to 0.5
        let expected = ((0.8367_f64 + 0.95 + 0.95 + 0.5) / 4.0 * 100.0).round() / 100.0;
        assert!((data.confidence - expected).abs() < 0.011, "got {}", data.confidence);
        assert!((0.5..=0.95).contains(&data.confidence));
    }

    #[test]
    fn not_ready_registry_refuses_prediction() {
        let dir = tempfile::tempdir().unwrap();
        write_leaf_forest(dir.path(), AidType::Tent, &[10.0]);
        let engine = PredictionEngine::new(Arc::new(ModelRegistry::load(dir.path())));

        assert!(matches!(
            engine.predict(&request()),
            Err(PredictError::NotReady)
        ));
    }

    #[test]
    fn unchecked_prediction_covers_available_models_only() {
        let dir = tempfile::tempdir().unwrap();
        write_leaf_forest(dir.path(), AidType::Tent, &[10.0]);
        write_leaf_forest(dir.path(), AidType::Blanket, &[20.0]);
        write_leaf_forest(dir.path(), AidType::Container, &[30.0]);
        let engine = PredictionEngine::new(Arc::new(ModelRegistry::load(dir.path())));

        let data = engine.predict_unchecked(&request());
        assert_eq!(data.predictions.len(), 3);
        assert!(!data.predictions.contains_key(&AidType::FoodPackage));
    }

    #[test]
    fn failing_model_degrades_to_zero_without_aborting() {
        let dir = tempfile::tempdir().unwrap();
        write_leaf_forest(dir.path(), AidType::Tent, &[10.0]);
        write_leaf_forest(dir.path(), AidType::Container, &[50.0]);
        write_leaf_forest(dir.path(), AidType::FoodPackage, &[900.0]);
        // Artifact passes load-time validation but references a feature
        // index past the vector, so traversal fails at predict time.
        let broken = serde_json::json!({
            "model_version": "test",
            "n_features": 9,
            "trees": [{ "nodes": [
                { "kind": "split", "feature": 40, "threshold": 1.0, "left": 1, "right": 1 },
                { "kind": "leaf", "value": 1.0 }
            ]}],
        });
        fs::write(dir.path().join("blanket_model.json"), broken.to_string()).unwrap();

        let engine = PredictionEngine::new(Arc::new(ModelRegistry::load(dir.path())));
        let data = engine.predict(&request()).unwrap();

        assert_eq!(data.predictions[&AidType::Blanket], 0);
        assert_eq!(data.predictions[&AidType::Tent], 10);
        assert_eq!(data.predictions.len(), 4);
        // three healthy zero-spread forests, clamped to 0.95 each
        assert!((data.confidence - 0.95).abs() < 1e-9, "got {}", data.confidence);
    }

    #[test]
    fn negative_raw_prediction_clamps_to_zero() {
        let forest = ForestModel {
            model_version: "test".to_string(),
            n_features: 9,
            trees: vec![DecisionTree {
                nodes: vec![TreeNode::Leaf { value: -12.4 }],
            }],
        };
        let model = TrainedModel::Forest(forest);
        let (quantity, _) = PredictionEngine::predict_one(&model, &vectorize(&request())).unwrap();
        assert_eq!(quantity, 0);
    }

    #[test]
    fn engine_is_deterministic_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let engine = PredictionEngine::new(full_registry(dir.path()));
        let first = engine.predict(&request()).unwrap();
        let second = engine.predict(&request()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fractional_raw_prediction_rounds_to_nearest() {
        let forest = ForestModel {
            model_version: "test".to_string(),
            n_features: 9,
            trees: vec![
                DecisionTree {
                    nodes: vec![TreeNode::Leaf { value: 10.0 }],
                },
                DecisionTree {
                    nodes: vec![TreeNode::Leaf { value: 11.0 }],
                },
            ],
        };
        let model = TrainedModel::Forest(forest);
        let (quantity, _) = PredictionEngine::predict_one(&model, &vectorize(&request())).unwrap();
        assert_eq!(quantity, 11); // mean 10.5 rounds away from zero
    }
}
