use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::embedding;
use crate::error::{Result, ScoutError};
use crate::pca::{PcaParams, ScalerParams};
use crate::roster::{Roster, SIM_FEATURES};

pub const ARTIFACT_VERSION: u32 = 1;

/// Fitted standardization + projection, persisted as JSON by the offline fitter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityArtifact {
    pub version: u32,
    pub generated_at: String,
    #[serde(default)]
    pub dataset_fingerprint: Option<String>,
    pub min_90s: f64,
    pub seed: u64,
    pub players_used: usize,
    /// Column order the scaler and projection were fitted on.
    pub feature_names: Vec<String>,
    pub scaler: ScalerParams,
    pub pca: PcaParams,
}

impl SimilarityArtifact {
    pub fn fit(
        rows: &[Vec<f64>],
        feature_names: Vec<String>,
        n_components: usize,
        seed: u64,
    ) -> Result<Self> {
        if rows.first().is_some_and(|r| r.len() != feature_names.len()) {
            return Err(ScoutError::Fit(format!(
                "{} feature names for {} columns",
                feature_names.len(),
                rows[0].len()
            )));
        }
        let scaler = ScalerParams::fit(rows)?;
        let scaled: Vec<Vec<f64>> = rows.iter().map(|r| scaler.transform(r)).collect();
        let pca = PcaParams::fit(&scaled, n_components, seed)?;
        Ok(Self {
            version: ARTIFACT_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            dataset_fingerprint: None,
            min_90s: 0.0,
            seed,
            players_used: rows.len(),
            feature_names,
            scaler,
            pca,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScoutError::MissingArtifact {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path)?;
        let artifact = serde_json::from_str::<Self>(&raw)?;
        artifact.validate()?;
        info!(
            path = %path.display(),
            features = artifact.feature_names.len(),
            components = artifact.dim(),
            "loaded similarity artifact"
        );
        Ok(artifact)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err(ScoutError::InvalidArtifact("no feature names".into()));
        }
        if self.version != ARTIFACT_VERSION {
            return Err(ScoutError::InvalidArtifact(format!(
                "unsupported version {}",
                self.version
            )));
        }
        if self.scaler.means.len() != n || self.scaler.scales.len() != n || self.pca.dim() != n {
            return Err(ScoutError::InvalidArtifact(format!(
                "scaler/projection width does not match {n} features"
            )));
        }
        if self.pca.components.is_empty() || self.pca.components.iter().any(|c| c.len() != n) {
            return Err(ScoutError::InvalidArtifact(
                "projection components are empty or ragged".into(),
            ));
        }
        if self.scaler.scales.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(ScoutError::InvalidArtifact("zero or non-finite scale".into()));
        }
        Ok(())
    }

    /// Output dimensionality of the embedding.
    pub fn dim(&self) -> usize {
        self.pca.n_components()
    }

    pub fn explained_variance(&self) -> f64 {
        self.pca.explained_variance_ratio.iter().sum()
    }

    /// Raw feature vector (in `feature_names` order) to embedding.
    pub fn transform(&self, raw: &[f64]) -> Vec<f64> {
        self.pca.transform(&self.scaler.transform(raw))
    }
}

/// Fit on the same eligible rows the embedding builder will later use.
pub fn fit_similarity_artifact(
    roster: &Roster,
    min_90s: f64,
    n_components: usize,
    seed: u64,
) -> Result<SimilarityArtifact> {
    let feature_names: Vec<String> = SIM_FEATURES.iter().map(|s| s.to_string()).collect();
    let rows: Vec<Vec<f64>> = embedding::eligible_rows(roster, min_90s, &feature_names)
        .into_iter()
        .filter_map(|idx| embedding::raw_features(&roster.records()[idx], &feature_names))
        .collect();

    let mut artifact = SimilarityArtifact::fit(&rows, feature_names, n_components, seed)?;
    artifact.min_90s = min_90s;
    artifact.dataset_fingerprint = roster.fingerprint().map(str::to_string);
    info!(
        players_used = artifact.players_used,
        explained_variance = artifact.explained_variance(),
        "fitted similarity artifact"
    );
    Ok(artifact)
}
