use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::Candlestick;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dataset: DatasetSettings,
    pub trainer: TrainerSettings,
    pub model_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetSettings::default(),
            trainer: TrainerSettings::default(),
            model_path: "candlestick_model.json".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file; a missing file means defaults.
    pub fn load(path: &str) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let config = toml::from_str(&raw)
                    .map_err(|e| anyhow!("Malformed config file {}: {}", path, e))?;
                debug!("Loaded configuration from {}", path);
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(anyhow!("Failed to read config file {}: {}", path, e)),
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.dataset.window == 0 {
            errors.push("window must be > 0".to_string());
        }
        if self.dataset.lookahead == 0 {
            errors.push("lookahead must be > 0".to_string());
        }
        if self.dataset.doubling_multiplier <= 1.0 {
            errors.push("doubling_multiplier must be > 1".to_string());
        }

        if self.trainer.max_iter == 0 {
            errors.push("max_iter must be > 0".to_string());
        }
        if self.trainer.learning_rate <= 0.0 || self.trainer.learning_rate > 1.0 {
            errors.push("learning_rate must be between 0 and 1".to_string());
        }
        if self.trainer.l2_lambda < 0.0 {
            errors.push("l2_lambda must be >= 0".to_string());
        }
        if self.trainer.min_training_samples < 2 {
            errors.push("min_training_samples must be >= 2".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Windowing & labeling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    /// Number of candlesticks in each input window.
    pub window: usize,
    /// Number of future candlesticks scanned for the doubling peak.
    pub lookahead: usize,
    /// Peak-to-reference multiplier that flips the label to 1.
    pub doubling_multiplier: f64,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            window: 200,
            lookahead: 10,
            doubling_multiplier: 2.0,
        }
    }
}

impl DatasetSettings {
    /// Flattened feature length: asset window plus market window.
    pub fn feature_len(&self) -> usize {
        2 * self.window * Candlestick::FIELDS
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerSettings {
    pub max_iter: usize,
    pub learning_rate: f64,
    pub l2_lambda: f64,
    pub min_training_samples: usize,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            learning_rate: 0.01,
            l2_lambda: 0.01,
            min_training_samples: 30,
        }
    }
}
