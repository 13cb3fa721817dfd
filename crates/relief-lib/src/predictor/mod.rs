//! Aid quantity prediction pipeline

mod confidence;
mod engine;
mod features;
mod forest;
mod model;

pub use confidence::{
    estimate, spread_confidence, MAX_CONFIDENCE, MIN_CONFIDENCE, PLAIN_MODEL_CONFIDENCE,
    ZERO_MEAN_CONFIDENCE,
};
pub use engine::PredictionEngine;
pub use features::vectorize;
pub use forest::{DecisionTree, ForestModel, TreeNode};
pub use model::{OnnxModel, TrainedModel};
