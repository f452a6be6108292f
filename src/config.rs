use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

pub const DEFAULT_DATASET_PATH: &str = "data/players_full_2425_with_score.csv";
pub const DEFAULT_SIMILARITY_ARTIFACT_PATH: &str = "models/similarity_artifact.json";
pub const DEFAULT_PERFORMANCE_MODEL_PATH: &str = "models/player_performance_model.json";

/// Everything a run needs, passed explicitly into each component.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoutConfig {
    pub dataset_path: PathBuf,
    pub similarity_artifact_path: PathBuf,
    pub performance_model_path: PathBuf,
    /// Minimum full-match equivalents played to enter the similarity pool.
    pub min_90s: f64,
    pub n_components: usize,
    pub seed: u64,
    pub top_n: usize,
    pub same_position: bool,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            similarity_artifact_path: PathBuf::from(DEFAULT_SIMILARITY_ARTIFACT_PATH),
            performance_model_path: PathBuf::from(DEFAULT_PERFORMANCE_MODEL_PATH),
            min_90s: 5.0,
            n_components: 8,
            seed: 42,
            top_n: 10,
            same_position: true,
        }
    }
}

/// `.env.local` first so it wins over `.env`; both are optional.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

impl ScoutConfig {
    /// Defaults overlaid with `PLAYER_SCOUT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("PLAYER_SCOUT_DATASET") {
            cfg.dataset_path = PathBuf::from(v);
        }
        if let Some(v) = get("PLAYER_SCOUT_SIMILARITY_ARTIFACT") {
            cfg.similarity_artifact_path = PathBuf::from(v);
        }
        if let Some(v) = get("PLAYER_SCOUT_PERFORMANCE_MODEL") {
            cfg.performance_model_path = PathBuf::from(v);
        }
        if let Some(v) = parsed::<f64>("PLAYER_SCOUT_MIN_90S", get("PLAYER_SCOUT_MIN_90S")) {
            cfg.min_90s = v;
        }
        if let Some(v) = parsed::<usize>("PLAYER_SCOUT_COMPONENTS", get("PLAYER_SCOUT_COMPONENTS")) {
            cfg.n_components = v;
        }
        if let Some(v) = parsed::<u64>("PLAYER_SCOUT_SEED", get("PLAYER_SCOUT_SEED")) {
            cfg.seed = v;
        }
        if let Some(v) = parsed::<usize>("PLAYER_SCOUT_TOP_N", get("PLAYER_SCOUT_TOP_N")) {
            cfg.top_n = v;
        }
        if let Some(v) = get("PLAYER_SCOUT_SAME_POSITION") {
            cfg.same_position = !matches!(
                v.to_ascii_lowercase().as_str(),
                "0" | "false" | "off" | "no"
            );
        }
        cfg
    }
}

fn parsed<T: FromStr>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable config value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_map(pairs: &[(&str, &str)]) -> ScoutConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ScoutConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(from_map(&[]), ScoutConfig::default());
    }

    #[test]
    fn overrides_apply_and_bad_numbers_are_ignored() {
        let cfg = from_map(&[
            ("PLAYER_SCOUT_DATASET", " /tmp/players.csv "),
            ("PLAYER_SCOUT_MIN_90S", "7.5"),
            ("PLAYER_SCOUT_TOP_N", "many"),
            ("PLAYER_SCOUT_SAME_POSITION", "off"),
        ]);
        assert_eq!(cfg.dataset_path, PathBuf::from("/tmp/players.csv"));
        assert_eq!(cfg.min_90s, 7.5);
        assert_eq!(cfg.top_n, 10);
        assert!(!cfg.same_position);
    }
}
