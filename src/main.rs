use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use player_scout::config::{ScoutConfig, load_dotenv};
use player_scout::embedding::build_embeddings_from_config;
use player_scout::logging::init_tracing;
use player_scout::player_id::{PlayerCandidate, PlayerQuery};
use player_scout::ranking::{
    RankOptions, SimilarPlayer, SimilarityOutcome, find_similar, find_similar_for_row,
};
use player_scout::roster::Roster;
use player_scout::selection::{CandidateSelector, ConsoleSelector, PickFirst, candidate_line};

/// Find the players statistically closest to a given player.
#[derive(Parser, Debug)]
#[command(name = "player_scout")]
struct Args {
    /// Player name; prompted for when omitted
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    squad: Option<String>,

    #[arg(long)]
    comp: Option<String>,

    #[arg(long)]
    pos: Option<String>,

    /// Only accept whole-name matches
    #[arg(long)]
    exact: bool,

    /// Number of similar players to list
    #[arg(long)]
    top_n: Option<usize>,

    /// Rank across every position instead of the player's own
    #[arg(long)]
    all_positions: bool,

    /// Minimum 90s played to enter the comparison pool
    #[arg(long)]
    min_90s: Option<f64>,

    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Fitted similarity artifact (see `fit_similarity`)
    #[arg(long)]
    artifact: Option<PathBuf>,

    /// Take the first match for ambiguous names instead of prompting
    #[arg(long)]
    pick_first: bool,
}

impl Args {
    fn apply(&self, mut cfg: ScoutConfig) -> ScoutConfig {
        if let Some(n) = self.top_n {
            cfg.top_n = n;
        }
        if self.all_positions {
            cfg.same_position = false;
        }
        if let Some(m) = self.min_90s {
            cfg.min_90s = m;
        }
        if let Some(path) = &self.dataset {
            cfg.dataset_path = path.clone();
        }
        if let Some(path) = &self.artifact {
            cfg.similarity_artifact_path = path.clone();
        }
        cfg
    }
}

fn main() -> Result<()> {
    load_dotenv();
    init_tracing("warn");
    let args = Args::parse();
    let cfg = args.apply(ScoutConfig::from_env());

    let roster = Roster::from_path(&cfg.dataset_path)
        .with_context(|| format!("load dataset {}", cfg.dataset_path.display()))?;
    let embeddings =
        build_embeddings_from_config(&roster, &cfg).context("build similarity embeddings")?;

    let name = match args.name.clone() {
        Some(n) => n,
        None => prompt("Enter player name: ")?,
    };
    let query = PlayerQuery {
        name,
        squad: args.squad.clone(),
        comp: args.comp.clone(),
        pos: args.pos.clone(),
        allow_partial: !args.exact,
    };
    let options = RankOptions::from_config(&cfg);

    let outcome = match find_similar(&roster, &embeddings, &query, options)? {
        SimilarityOutcome::Ambiguous(candidates) => {
            let mut selector: Box<dyn CandidateSelector> = if args.pick_first {
                Box::new(PickFirst)
            } else {
                Box::new(ConsoleSelector::stdio())
            };
            let Some(idx) = selector.select(&candidates)? else {
                println!("Cancelled.");
                return Ok(());
            };
            find_similar_for_row(&roster, &embeddings, idx, options)
        }
        other => other,
    };

    report(&roster, &query.name, &outcome);
    Ok(())
}

fn report(roster: &Roster, name: &str, outcome: &SimilarityOutcome<'_>) {
    match outcome {
        SimilarityOutcome::Ranked { query, similar } => {
            let r = query.record;
            println!(
                "Player: {} | {} | {}",
                r.player,
                r.squad.as_deref().unwrap_or("N/A"),
                r.pos.as_deref().unwrap_or("N/A")
            );
            if similar.is_empty() {
                println!("No comparable players found.");
            } else {
                print_table(similar);
            }
        }
        SimilarityOutcome::NotFound { closest } => {
            println!("No player found matching: {name}");
            print_closest(closest);
        }
        SimilarityOutcome::Ambiguous(candidates) => {
            println!("Player name is ambiguous:");
            for (k, c) in candidates.iter().enumerate() {
                println!("{}", candidate_line(k + 1, c));
            }
        }
        SimilarityOutcome::NotEligible { idx } => match roster.get(*idx) {
            Some(r) => println!(
                "{} ({}) is outside the comparison pool: 90s={}, needs every similarity statistic.",
                r.player,
                r.squad.as_deref().unwrap_or("N/A"),
                r.nineties
                    .map(|n| format!("{n:.1}"))
                    .unwrap_or_else(|| "N/A".to_string())
            ),
            None => println!("Row {idx} is not in the dataset."),
        },
    }
}

fn print_closest(closest: &[PlayerCandidate]) {
    if closest.is_empty() {
        return;
    }
    println!("Closest matches:");
    for c in closest {
        println!("  {} | {} | {}", c.player, c.squad, c.pos);
    }
}

fn print_table(rows: &[SimilarPlayer<'_>]) {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|s| {
            [
                s.record.player.clone(),
                s.record.squad.clone().unwrap_or_default(),
                s.record.pos.clone().unwrap_or_default(),
                format!("{:.4}", s.score),
            ]
        })
        .collect();
    let header = ["Player", "Squad", "Pos", "Similarity"];
    let mut widths = header.map(|h| h.chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    println!(
        "{:<w0$}  {:<w1$}  {:<w2$}  {:>w3$}",
        header[0],
        header[1],
        header[2],
        header[3],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
        w3 = widths[3]
    );
    for row in &cells {
        println!(
            "{:<w0$}  {:<w1$}  {:<w2$}  {:>w3$}",
            row[0],
            row[1],
            row[2],
            row[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3]
        );
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read player name")?;
    let name = line.trim().to_string();
    if name.is_empty() {
        return Err(anyhow!("no player name given"));
    }
    Ok(name)
}
