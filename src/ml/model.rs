use anyhow::{anyhow, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TrainerSettings;
use crate::dataset::TrainingSet;

/// Training report after model fit
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub samples: usize,
    pub accuracy: f64,
    pub positives: usize,
    pub negatives: usize,
}

/// Model weights for persistence (logistic regression coefficients)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelWeights {
    coefficients: Vec<f64>,
    intercept: f64,
    feature_means: Vec<f64>,
    feature_stds: Vec<f64>,
}

impl ModelWeights {
    pub fn num_features(&self) -> usize {
        self.coefficients.len()
    }
}

/// Doubling predictor using logistic regression over flattened candlestick
/// windows. Training is plain batch gradient descent with no random
/// initialization, so identical inputs always produce identical weights.
pub struct DoublingPredictor {
    weights: Option<ModelWeights>,
    settings: TrainerSettings,
}

impl DoublingPredictor {
    pub fn new(settings: TrainerSettings) -> Self {
        Self {
            weights: None,
            settings,
        }
    }

    pub fn from_weights(weights: ModelWeights, settings: TrainerSettings) -> Self {
        Self {
            weights: Some(weights),
            settings,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.weights.is_some()
    }

    pub fn weights(&self) -> Option<&ModelWeights> {
        self.weights.as_ref()
    }

    /// Fit the model on a built training set.
    pub fn train(&mut self, data: &TrainingSet) -> Result<TrainingReport> {
        let n = data.len();
        if n < self.settings.min_training_samples {
            return Err(anyhow!(
                "Not enough training samples: {} < {}",
                n,
                self.settings.min_training_samples
            ));
        }

        let num_features = data
            .samples
            .first()
            .map(|s| s.features.len())
            .ok_or_else(|| anyhow!("Empty training set"))?;
        if let Some(bad) = data
            .samples
            .iter()
            .find(|s| s.features.len() != num_features)
        {
            return Err(anyhow!(
                "Inconsistent feature lengths in training set: {} vs {}",
                num_features,
                bad.features.len()
            ));
        }

        let mut features = Array2::<f64>::zeros((n, num_features));
        let mut labels = Vec::with_capacity(n);
        for (i, sample) in data.samples.iter().enumerate() {
            for (j, &val) in sample.features.iter().enumerate() {
                features[[i, j]] = val;
            }
            labels.push(sample.label);
        }

        // Compute feature means and stds for normalization
        let means = features
            .mean_axis(Axis(0))
            .ok_or_else(|| anyhow!("Empty training set"))?;
        let stds = features.std_axis(Axis(0), 1.0);

        // Normalize features (z-score); constant columns collapse to zero
        let mut normalized = features.clone();
        for j in 0..num_features {
            let std = stds[j];
            if std > 1e-10 {
                for i in 0..n {
                    normalized[[i, j]] = (features[[i, j]] - means[j]) / std;
                }
            } else {
                for i in 0..n {
                    normalized[[i, j]] = 0.0;
                }
            }
        }

        let (coefficients, intercept) = self.fit_logistic_regression(&normalized, &labels);

        // Training accuracy against the 0.5 decision boundary
        let mut correct = 0;
        for i in 0..n {
            let mut z = intercept;
            for j in 0..num_features {
                z += coefficients[j] * normalized[[i, j]];
            }
            let predicted = sigmoid(z) >= 0.5;
            let actual = labels[i] >= 0.5;
            if predicted == actual {
                correct += 1;
            }
        }
        let accuracy = correct as f64 / n as f64;

        let positives = data.positives();
        let negatives = n - positives;

        self.weights = Some(ModelWeights {
            coefficients,
            intercept,
            feature_means: means.to_vec(),
            feature_stds: stds.to_vec(),
        });

        info!(
            "Model trained: {} samples, {:.1}% accuracy, {}/{} positive labels",
            n,
            accuracy * 100.0,
            positives,
            n
        );

        Ok(TrainingReport {
            samples: n,
            accuracy,
            positives,
            negatives,
        })
    }

    /// Fit logistic regression via gradient descent
    fn fit_logistic_regression(&self, features: &Array2<f64>, labels: &[f64]) -> (Vec<f64>, f64) {
        let n = features.nrows();
        let num_features = features.ncols();
        let lambda = self.settings.l2_lambda;
        let learning_rate = self.settings.learning_rate;

        let mut coefficients = vec![0.0; num_features];
        let mut intercept = 0.0;

        for _iter in 0..self.settings.max_iter {
            let mut grad_coef = vec![0.0; num_features];
            let mut grad_intercept = 0.0;

            for i in 0..n {
                let mut z = intercept;
                for j in 0..num_features {
                    z += coefficients[j] * features[[i, j]];
                }
                let error = sigmoid(z) - labels[i];

                grad_intercept += error;
                for j in 0..num_features {
                    grad_coef[j] += error * features[[i, j]];
                }
            }

            intercept -= learning_rate * grad_intercept / n as f64;
            for j in 0..num_features {
                coefficients[j] -=
                    learning_rate * (grad_coef[j] / n as f64 + lambda * coefficients[j]);
            }
        }

        (coefficients, intercept)
    }

    /// Predict the doubling probability for one flattened feature vector.
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        let weights = self
            .weights
            .as_ref()
            .ok_or_else(|| anyhow!("Model has not been trained"))?;

        if features.len() != weights.num_features() {
            return Err(anyhow!(
                "Feature length mismatch: model expects {}, got {}",
                weights.num_features(),
                features.len()
            ));
        }

        let mut z = weights.intercept;
        for (j, &value) in features.iter().enumerate() {
            let std = weights.feature_stds[j];
            let normalized = if std > 1e-10 {
                (value - weights.feature_means[j]) / std
            } else {
                0.0
            };
            z += weights.coefficients[j] * normalized;
        }

        Ok(sigmoid(z))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
