use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use player_scout::config::{ScoutConfig, load_dotenv};
use player_scout::logging::init_tracing;
use player_scout::roster::Roster;
use player_scout::similarity_model::fit_similarity_artifact;

/// Fit the standardization + PCA transform used for player similarity.
#[derive(Parser, Debug)]
#[command(name = "fit_similarity")]
struct Args {
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Where to write the artifact
    #[arg(long)]
    out: Option<PathBuf>,

    /// Number of principal components kept
    #[arg(long)]
    components: Option<usize>,

    #[arg(long)]
    min_90s: Option<f64>,

    /// Seed for the eigenvector start vectors; stored in the artifact
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    load_dotenv();
    init_tracing("info");
    let args = Args::parse();

    let mut cfg = ScoutConfig::from_env();
    if let Some(path) = args.dataset {
        cfg.dataset_path = path;
    }
    if let Some(path) = args.out {
        cfg.similarity_artifact_path = path;
    }
    if let Some(k) = args.components {
        cfg.n_components = k;
    }
    if let Some(m) = args.min_90s {
        cfg.min_90s = m;
    }
    if let Some(s) = args.seed {
        cfg.seed = s;
    }

    let roster = Roster::from_path(&cfg.dataset_path)
        .with_context(|| format!("load dataset {}", cfg.dataset_path.display()))?;
    let artifact = fit_similarity_artifact(&roster, cfg.min_90s, cfg.n_components, cfg.seed)
        .context("fit similarity transform")?;
    artifact
        .save(&cfg.similarity_artifact_path)
        .with_context(|| {
            format!(
                "write similarity artifact {}",
                cfg.similarity_artifact_path.display()
            )
        })?;

    println!(
        "Saved similarity artifact to: {}",
        cfg.similarity_artifact_path.display()
    );
    println!("Players used: {}", artifact.players_used);
    println!("Explained variance: {:.4}", artifact.explained_variance());
    Ok(())
}
