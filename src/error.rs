use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoutError>;

#[derive(Error, Debug)]
pub enum ScoutError {
    /// A column the operation cannot run without is absent from the dataset.
    #[error("dataset is missing required column '{column}'")]
    Schema { column: String },

    /// A fitted artifact has not been produced yet. Never recovered by fitting on the fly.
    #[error("fitted artifact not found at {}; run the fitter first", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("player '{player}' has no value for feature '{feature}'")]
    MissingFeature { player: String, feature: String },

    #[error("embedding shape mismatch: {0}")]
    Shape(String),

    #[error("fit failed: {0}")]
    Fit(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
