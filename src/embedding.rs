use tracing::{info, warn};

use crate::config::ScoutConfig;
use crate::error::{Result, ScoutError};
use crate::roster::{NINETIES_COLUMN, Roster, RosterRecord};
use crate::similarity_model::SimilarityArtifact;

/// Embedding matrix over the eligible subset of a roster.
/// `rows[i]` is the roster index of `vectors[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Embeddings {
    rows: Vec<usize>,
    vectors: Vec<Vec<f64>>,
    dim: usize,
}

impl Embeddings {
    pub fn new(rows: Vec<usize>, vectors: Vec<Vec<f64>>) -> Result<Self> {
        if rows.len() != vectors.len() {
            return Err(ScoutError::Shape(format!(
                "{} rows for {} vectors",
                rows.len(),
                vectors.len()
            )));
        }
        let dim = vectors.first().map(Vec::len).unwrap_or(0);
        if vectors.iter().any(|v| v.len() != dim) {
            return Err(ScoutError::Shape("vectors differ in length".into()));
        }
        Ok(Self { rows, vectors, dim })
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn vectors(&self) -> &[Vec<f64>] {
        &self.vectors
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Matrix position of a roster row, if it was eligible.
    pub fn position_of(&self, roster_idx: usize) -> Option<usize> {
        self.rows.iter().position(|&r| r == roster_idx)
    }

    pub fn vector(&self, pos: usize) -> Option<&[f64]> {
        self.vectors.get(pos).map(Vec::as_slice)
    }
}

/// Feature values in the given order, or `None` if any is missing.
pub fn raw_features<S: AsRef<str>>(
    record: &RosterRecord,
    feature_names: &[S],
) -> Option<Vec<f64>> {
    feature_names
        .iter()
        .map(|name| record.numeric(name.as_ref()))
        .collect()
}

/// Rows meeting the playing-time threshold with every feature present.
/// Missing values exclude the row; nothing is imputed.
pub fn eligible_rows<S: AsRef<str>>(
    roster: &Roster,
    min_90s: f64,
    feature_names: &[S],
) -> Vec<usize> {
    let mut below_threshold = 0usize;
    let mut missing = 0usize;
    let mut out = Vec::new();
    for (idx, record) in roster.records().iter().enumerate() {
        if !record.nineties.is_some_and(|n| n >= min_90s) {
            below_threshold += 1;
            continue;
        }
        if raw_features(record, feature_names).is_none() {
            missing += 1;
            continue;
        }
        out.push(idx);
    }
    info!(
        eligible = out.len(),
        below_threshold,
        missing_features = missing,
        min_90s,
        "filtered roster for embedding"
    );
    out
}

pub fn build_embeddings(
    roster: &Roster,
    min_90s: f64,
    artifact: &SimilarityArtifact,
) -> Result<Embeddings> {
    artifact.validate()?;
    if !roster.has_column(NINETIES_COLUMN) {
        return Err(ScoutError::Schema {
            column: NINETIES_COLUMN.to_string(),
        });
    }
    let probe = RosterRecord::default();
    if let Some(unknown) = artifact
        .feature_names
        .iter()
        .find(|name| probe.feature(name).is_none() && !roster.has_column(name))
    {
        return Err(ScoutError::Schema {
            column: unknown.clone(),
        });
    }

    let rows = eligible_rows(roster, min_90s, &artifact.feature_names);
    let vectors = rows
        .iter()
        .filter_map(|&idx| raw_features(&roster.records()[idx], &artifact.feature_names))
        .map(|raw| artifact.transform(&raw))
        .collect();
    Embeddings::new(rows, vectors)
}

/// Loads the fitted artifact named by the config and embeds the roster.
/// Fails with `MissingArtifact` if the fitter has not run; never fits here.
pub fn build_embeddings_from_config(roster: &Roster, config: &ScoutConfig) -> Result<Embeddings> {
    let artifact = SimilarityArtifact::load(&config.similarity_artifact_path)?;
    if let (Some(fitted), Some(current)) = (&artifact.dataset_fingerprint, roster.fingerprint())
        && fitted != current
    {
        warn!("dataset changed since the similarity artifact was fitted; consider refitting");
    }
    build_embeddings(roster, config.min_90s, &artifact)
}
