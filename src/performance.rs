use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, ScoutError};
use crate::roster::RosterRecord;

fn default_threshold() -> f64 {
    0.5
}

/// Standardized logistic model scoring "good performance" for one player row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceModel {
    pub feature_names: Vec<String>,
    pub feature_means: Vec<f64>,
    pub feature_stds: Vec<f64>,
    pub coeffs: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformancePrediction {
    /// Probability of the positive class.
    pub probability: f64,
    pub label: bool,
}

impl PerformanceModel {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScoutError::MissingArtifact {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path)?;
        let model = serde_json::from_str::<Self>(&raw)?;
        model.validate()?;
        info!(
            path = %path.display(),
            features = model.feature_names.len(),
            "loaded performance model"
        );
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        let n = self.feature_names.len();
        if n == 0
            || self.feature_means.len() != n
            || self.feature_stds.len() != n
            || self.coeffs.len() != n
        {
            return Err(ScoutError::InvalidArtifact(format!(
                "performance model expects {n} means, stds and coeffs"
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ScoutError::InvalidArtifact(format!(
                "threshold {} outside [0, 1]",
                self.threshold
            )));
        }
        Ok(())
    }

    pub fn predict(&self, record: &RosterRecord) -> Result<PerformancePrediction> {
        let mut logit = self.intercept;
        let params = self
            .coeffs
            .iter()
            .zip(self.feature_means.iter().zip(&self.feature_stds));
        for (name, (coeff, (mean, std))) in self.feature_names.iter().zip(params) {
            let Some(x) = record.numeric(name) else {
                return Err(ScoutError::MissingFeature {
                    player: record.player.clone(),
                    feature: name.clone(),
                });
            };
            logit += coeff * standardized(x, *mean, *std);
        }
        let probability = sigmoid(logit);
        Ok(PerformancePrediction {
            probability,
            label: probability >= self.threshold,
        })
    }
}

fn standardized(raw: f64, mean: f64, std: f64) -> f64 {
    (raw - mean) / std.max(1e-6)
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
