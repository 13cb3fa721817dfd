//! Model registry
//!
//! Owns one trained predictor per aid type. Loading happens once before
//! the service accepts requests; afterwards the registry is immutable and
//! shared read-only via `Arc`, so the serving path takes no locks. A
//! future reload must build a fresh registry and swap the whole `Arc`.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::{error, info, warn};

use crate::error::ArtifactError;
use crate::models::AidType;
use crate::predictor::{ForestModel, OnnxModel, TrainedModel};
use serde::Serialize;

/// Lifecycle of the registry's model set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessState {
    Uninitialized,
    Loading,
    /// All required aid types have a model.
    Ready,
    /// Some but not all aid types have a model.
    Degraded,
    /// No models, or the artifact directory is missing.
    Empty,
}

/// Registry of trained predictors, one per aid type.
pub struct ModelRegistry {
    models: BTreeMap<AidType, TrainedModel>,
    state: ReadinessState,
}

impl ModelRegistry {
    /// An unloaded registry; `is_ready` is false until `load` runs.
    pub fn empty() -> Self {
        Self {
            models: BTreeMap::new(),
            state: ReadinessState::Uninitialized,
        }
    }

    /// Load one artifact per aid type from the given directory.
    ///
    /// Never fails out: a missing directory yields an `Empty` registry, a
    /// missing or corrupt artifact leaves that aid type absent. Readiness
    /// requires all four models.
    pub fn load(model_dir: &Path) -> Self {
        let mut registry = Self {
            models: BTreeMap::new(),
            state: ReadinessState::Loading,
        };

        info!(model_dir = %model_dir.display(), "Loading model artifacts");
        if !model_dir.is_dir() {
            error!(model_dir = %model_dir.display(), "Models directory not found");
            registry.state = ReadinessState::Empty;
            return registry;
        }

        for aid_type in AidType::ALL {
            match Self::load_artifact(model_dir, aid_type) {
                Ok(Some(model)) => {
                    info!(aid_type = aid_type.key(), "Model loaded");
                    registry.models.insert(aid_type, model);
                }
                Ok(None) => {
                    warn!(aid_type = aid_type.key(), "Model artifact not found");
                }
                Err(err) => {
                    error!(aid_type = aid_type.key(), error = %err, "Failed to load model artifact");
                }
            }
        }

        registry.state = match registry.models.len() {
            n if n == AidType::ALL.len() => ReadinessState::Ready,
            0 => ReadinessState::Empty,
            _ => ReadinessState::Degraded,
        };
        info!(
            loaded = registry.models.len(),
            required = AidType::ALL.len(),
            state = ?registry.state,
            "Model loading finished"
        );
        registry
    }

    /// Fixed filename mapping: `<key>_model.json` (portable forest) is
    /// preferred, `<key>_model.onnx` (opaque plain model) second.
    fn load_artifact(
        model_dir: &Path,
        aid_type: AidType,
    ) -> Result<Option<TrainedModel>, ArtifactError> {
        let forest_path = model_dir.join(format!("{}_model.json", aid_type.key()));
        if forest_path.is_file() {
            return ForestModel::from_path(&forest_path)
                .map(TrainedModel::Forest)
                .map(Some);
        }
        let onnx_path = model_dir.join(format!("{}_model.onnx", aid_type.key()));
        if onnx_path.is_file() {
            return OnnxModel::from_path(&onnx_path)
                .map(TrainedModel::Onnx)
                .map(Some);
        }
        Ok(None)
    }

    /// True only when every aid type has a model.
    pub fn is_ready(&self) -> bool {
        self.state == ReadinessState::Ready
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn get(&self, aid_type: AidType) -> Option<&TrainedModel> {
        self.models.get(&aid_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn leaf_forest_json(value: f64) -> String {
        format!(
            r#"{{"model_version": "test", "n_features": 9, "trees": [{{"nodes": [{{"kind": "leaf", "value": {value}}}]}}]}}"#
        )
    }

    fn write_forest(dir: &Path, aid_type: AidType, value: f64) -> PathBuf {
        let path = dir.join(format!("{}_model.json", aid_type.key()));
        fs::write(&path, leaf_forest_json(value)).unwrap();
        path
    }

    #[test]
    fn missing_directory_is_empty_not_ready() {
        let registry = ModelRegistry::load(Path::new("/nonexistent/models"));
        assert_eq!(registry.state(), ReadinessState::Empty);
        assert!(!registry.is_ready());
        assert_eq!(registry.model_count(), 0);
    }

    #[test]
    fn empty_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::load(dir.path());
        assert_eq!(registry.state(), ReadinessState::Empty);
        assert!(!registry.is_ready());
    }

    #[test]
    fn partial_model_set_is_degraded() {
        let dir = tempfile::tempdir().unwrap();
        write_forest(dir.path(), AidType::Tent, 100.0);
        write_forest(dir.path(), AidType::Blanket, 200.0);
        write_forest(dir.path(), AidType::Container, 50.0);

        let registry = ModelRegistry::load(dir.path());
        assert_eq!(registry.state(), ReadinessState::Degraded);
        assert!(!registry.is_ready());
        assert_eq!(registry.model_count(), 3);
        assert!(registry.get(AidType::Tent).is_some());
        assert!(registry.get(AidType::FoodPackage).is_none());
    }

    #[test]
    fn full_model_set_is_ready() {
        let dir = tempfile::tempdir().unwrap();
        for aid_type in AidType::ALL {
            write_forest(dir.path(), aid_type, 10.0);
        }
        let registry = ModelRegistry::load(dir.path());
        assert_eq!(registry.state(), ReadinessState::Ready);
        assert!(registry.is_ready());
        assert_eq!(registry.model_count(), 4);
    }

    #[test]
    fn corrupt_artifact_degrades_instead_of_failing() {
        let dir = tempfile::tempdir().unwrap();
        for aid_type in AidType::ALL {
            write_forest(dir.path(), aid_type, 10.0);
        }
        fs::write(dir.path().join("tent_model.json"), "not json").unwrap();

        let registry = ModelRegistry::load(dir.path());
        assert_eq!(registry.state(), ReadinessState::Degraded);
        assert!(registry.get(AidType::Tent).is_none());
        assert_eq!(registry.model_count(), 3);
    }

    #[test]
    fn empty_registry_is_uninitialized() {
        let registry = ModelRegistry::empty();
        assert_eq!(registry.state(), ReadinessState::Uninitialized);
        assert!(!registry.is_ready());
    }
}
