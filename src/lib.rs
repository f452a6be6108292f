pub mod config;
pub mod embedding;
pub mod error;
pub mod logging;
pub mod pca;
pub mod performance;
pub mod player_id;
pub mod ranking;
pub mod roster;
pub mod selection;
pub mod similarity_model;

pub use error::{Result, ScoutError};
