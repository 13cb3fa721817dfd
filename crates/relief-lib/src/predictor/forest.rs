//! Portable random-forest artifacts
//!
//! Trained forest regressors are re-exported into a neutral JSON format of
//! explicit per-tree split tables so inference does not depend on the
//! training runtime. Traversal starts at node 0 and goes left when
//! `feature <= threshold`, matching how the trees were exported.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ArtifactError;
use crate::models::{FeatureVector, NUM_FEATURES};

/// One node of a decision tree split table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A single regression tree, stored as a flat node table rooted at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Traverse the tree for one feature array.
    ///
    /// Bounds every step so a corrupt table (dangling child index, node
    /// cycle, out-of-range feature) errors instead of looping or panicking.
    pub fn predict(&self, features: &[f64; NUM_FEATURES]) -> Result<f64> {
        let mut index = 0usize;
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features
                        .get(*feature)
                        .copied()
                        .with_context(|| format!("split references feature {feature}"))?;
                    index = if value <= *threshold { *left } else { *right };
                }
                None => bail!("split references missing node {index}"),
            }
        }
        bail!("tree traversal did not reach a leaf")
    }
}

/// An ensemble of regression trees; prediction is the tree mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    #[serde(default)]
    pub model_version: String,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl ForestModel {
    /// Load and validate a forest artifact.
    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        let bytes = fs::read(path)?;
        let forest: ForestModel = serde_json::from_slice(&bytes)?;
        if forest.n_features != NUM_FEATURES {
            return Err(ArtifactError::FeatureMismatch {
                got: forest.n_features,
            });
        }
        if forest.trees.is_empty() {
            return Err(ArtifactError::EmptyForest);
        }
        Ok(forest)
    }

    /// Forest prediction: mean over all trees.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let predictions = self.tree_predictions(features)?;
        Ok(predictions.iter().sum::<f64>() / predictions.len() as f64)
    }

    /// Per-tree predictions, in tree order. The spread across these is
    /// what confidence estimation works from.
    pub fn tree_predictions(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let array = features.as_array();
        self.trees
            .iter()
            .enumerate()
            .map(|(i, tree)| tree.predict(&array).with_context(|| format!("tree {i}")))
            .collect()
    }
}
