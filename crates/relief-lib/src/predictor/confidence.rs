//! Ensemble-spread confidence estimation
//!
//! The spread of an ensemble's sub-estimator predictions is used as an
//! inverse confidence signal: confidence = 1 - coefficient of variation,
//! clamped to [0.5, 0.95]. This is a heuristic carried over verbatim from
//! the trained models' evaluation, not a calibrated probability; the
//! fallback constants and clamp bounds are part of behavioral parity.

use anyhow::Result;

use super::model::TrainedModel;
use crate::models::FeatureVector;

/// Confidence for models that expose no sub-estimators.
pub const PLAIN_MODEL_CONFIDENCE: f64 = 0.8;

/// Conservative fallback when the ensemble mean is not positive.
pub const ZERO_MEAN_CONFIDENCE: f64 = 0.5;

/// Clamp bounds for the spread-derived score.
pub const MIN_CONFIDENCE: f64 = 0.5;
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Estimate a model's confidence for one feature vector.
pub fn estimate(model: &TrainedModel, features: &FeatureVector) -> Result<f64> {
    match model.sub_predictions(features)? {
        Some(predictions) => Ok(spread_confidence(&predictions)),
        None => Ok(PLAIN_MODEL_CONFIDENCE),
    }
}

/// Confidence from the spread of sub-estimator predictions.
pub fn spread_confidence(predictions: &[f64]) -> f64 {
    let mean = mean(predictions);
    if mean <= 0.0 {
        return ZERO_MEAN_CONFIDENCE;
    }
    let cov = population_std_dev(predictions) / mean;
    (1.0 - cov).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor n, not n-1), matching how the
/// spread was computed when the heuristic was tuned.
fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
