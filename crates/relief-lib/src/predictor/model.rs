//! Trained model capabilities
//!
//! A loaded predictor is either a portable forest (an ensemble whose
//! per-tree spread drives confidence estimation) or an opaque ONNX model
//! loaded via tract (predict only). Models are immutable once loaded and
//! shared read-only across requests.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tract_onnx::prelude::*;

use super::forest::ForestModel;
use crate::error::ArtifactError;
use crate::models::{FeatureVector, NUM_FEATURES};

type TractPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Opaque regression model loaded from an ONNX artifact.
///
/// Exposes no sub-estimators; confidence estimation falls back to a
/// constant for this capability.
pub struct OnnxModel {
    plan: TractPlan,
}

impl OnnxModel {
    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        let bytes = fs::read(path)?;
        let plan = Self::build_plan(&bytes).map_err(|e| ArtifactError::Onnx(format!("{e:#}")))?;
        Ok(Self { plan })
    }

    fn build_plan(bytes: &[u8]) -> Result<TractPlan> {
        tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, NUM_FEATURES]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let data: Vec<f32> = features.as_array().iter().map(|v| *v as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, NUM_FEATURES), data)
            .context("Failed to shape input tensor")?
            .into();
        let result = self.plan.run(tvec!(input.into()))?;
        let output = result.first().context("No output from model")?;
        let view = output.to_array_view::<f32>()?;
        let value = view.iter().next().context("Empty model output")?;
        Ok(f64::from(*value))
    }
}

/// A trained predictor for one aid type.
pub enum TrainedModel {
    /// Ensemble capability: predict plus enumerable sub-estimators.
    Forest(ForestModel),
    /// Plain capability: predict only.
    Onnx(OnnxModel),
}

impl TrainedModel {
    /// Raw regression output for one feature vector.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64> {
        match self {
            TrainedModel::Forest(forest) => forest.predict(features),
            TrainedModel::Onnx(model) => model.predict(features),
        }
    }

    /// Per-sub-estimator predictions, or `None` for models without an
    /// ensemble to introspect.
    pub fn sub_predictions(&self, features: &FeatureVector) -> Result<Option<Vec<f64>>> {
        match self {
            TrainedModel::Forest(forest) => forest.tree_predictions(features).map(Some),
            TrainedModel::Onnx(_) => Ok(None),
        }
    }
}
