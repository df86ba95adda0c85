use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use super::model::{DoublingPredictor, ModelWeights, TrainingReport};
use crate::config::TrainerSettings;

/// Saved model file contents: weights plus training metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredModel {
    pub trained_at: DateTime<Utc>,
    pub samples: usize,
    pub accuracy: f64,
    weights: ModelWeights,
}

impl StoredModel {
    pub fn into_predictor(self, settings: TrainerSettings) -> DoublingPredictor {
        DoublingPredictor::from_weights(self.weights, settings)
    }
}

/// File-backed store for a single trained model.
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a trained model together with its training report.
    pub fn save(&self, predictor: &DoublingPredictor, report: &TrainingReport) -> Result<()> {
        let weights = predictor
            .weights()
            .ok_or_else(|| anyhow!("No trained model to save"))?;

        let stored = StoredModel {
            trained_at: Utc::now(),
            samples: report.samples,
            accuracy: report.accuracy,
            weights: weights.clone(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&self.path, json)?;
        info!(
            "Saved model ({} samples, {:.1}% accuracy) to {}",
            report.samples,
            report.accuracy * 100.0,
            self.path.display()
        );

        Ok(())
    }

    /// Load the saved model, if any. A missing file is `Ok(None)`, not an
    /// error; every other failure propagates.
    pub fn load(&self) -> Result<Option<StoredModel>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow!(
                    "Failed to read model file {}: {}",
                    self.path.display(),
                    e
                ))
            }
        };

        let stored: StoredModel = serde_json::from_str(&raw)
            .map_err(|e| anyhow!("Malformed model file {}: {}", self.path.display(), e))?;
        info!(
            "Loaded model from {} (trained {}, {} samples)",
            self.path.display(),
            stored.trained_at,
            stored.samples
        );

        Ok(Some(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{TrainingSample, TrainingSet};

    fn test_settings() -> TrainerSettings {
        TrainerSettings {
            max_iter: 500,
            learning_rate: 0.1,
            l2_lambda: 0.0,
            min_training_samples: 2,
        }
    }

    fn trained_predictor() -> (DoublingPredictor, TrainingReport) {
        let samples = [-3.0, -2.0, -1.0, 1.0, 2.0, 3.0]
            .iter()
            .map(|&x| TrainingSample {
                features: vec![x],
                label: if x > 0.0 { 1.0 } else { 0.0 },
            })
            .collect();
        let set = TrainingSet {
            samples,
            series_stats: Vec::new(),
        };
        let mut predictor = DoublingPredictor::new(test_settings());
        let report = predictor.train(&set).unwrap();
        (predictor, report)
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("missing.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_round_trip_preserves_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model.json"));

        let (predictor, report) = trained_predictor();
        store.save(&predictor, &report).unwrap();

        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.samples, report.samples);
        let reloaded = stored.into_predictor(test_settings());

        for x in [-2.5, -0.5, 0.5, 2.5] {
            assert_eq!(
                predictor.predict(&[x]).unwrap(),
                reloaded.predict(&[x]).unwrap()
            );
        }
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("nested/models/model.json"));

        let (predictor, report) = trained_predictor();
        store.save(&predictor, &report).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_untrained_model_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model.json"));

        let predictor = DoublingPredictor::new(test_settings());
        let report = TrainingReport {
            samples: 0,
            accuracy: 0.0,
            positives: 0,
            negatives: 0,
        };
        assert!(store.save(&predictor, &report).is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error_not_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = ModelStore::new(path);
        assert!(store.load().is_err());
    }
}
