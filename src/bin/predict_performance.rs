use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use player_scout::config::{ScoutConfig, load_dotenv};
use player_scout::logging::init_tracing;
use player_scout::performance::PerformanceModel;
use player_scout::player_id::{PlayerQuery, Resolution, closest_matches, resolve};
use player_scout::roster::Roster;
use player_scout::selection::{CandidateSelector, ConsoleSelector, PickFirst};

/// Score a player with the fitted performance model.
#[derive(Parser, Debug)]
#[command(name = "predict_performance")]
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

    /// How many other matches to list
    #[arg(long, default_value_t = 5)]
    top_k: usize,

    #[arg(long)]
    dataset: Option<PathBuf>,

    #[arg(long)]
    model: Option<PathBuf>,

    #[arg(long)]
    pick_first: bool,
}

fn main() -> Result<()> {
    load_dotenv();
    init_tracing("warn");
    let args = Args::parse();

    let mut cfg = ScoutConfig::from_env();
    if let Some(path) = &args.dataset {
        cfg.dataset_path = path.clone();
    }
    if let Some(path) = &args.model {
        cfg.performance_model_path = path.clone();
    }

    let model = PerformanceModel::load(&cfg.performance_model_path).with_context(|| {
        format!(
            "load performance model {}",
            cfg.performance_model_path.display()
        )
    })?;
    let roster = Roster::from_path(&cfg.dataset_path)
        .with_context(|| format!("load dataset {}", cfg.dataset_path.display()))?;

    let name = match args.name.clone() {
        Some(n) => n,
        None => prompt("Enter player name: ")?,
    };
    let query = PlayerQuery {
        name: name.clone(),
        squad: args.squad.clone(),
        comp: args.comp.clone(),
        pos: args.pos.clone(),
        allow_partial: !args.exact,
    };

    let resolution = resolve(&roster, &query)?;
    let idx = match &resolution {
        Resolution::Unique(player) => player.idx,
        Resolution::Ambiguous(candidates) => {
            let mut selector: Box<dyn CandidateSelector> = if args.pick_first {
                Box::new(PickFirst)
            } else {
                Box::new(ConsoleSelector::stdio())
            };
            let Some(idx) = selector.select(candidates)? else {
                println!("Cancelled.");
                return Ok(());
            };
            idx
        }
        Resolution::NotFound => {
            println!("No player found matching: {name}");
            let closest = closest_matches(roster.records().iter().enumerate(), &name, args.top_k);
            if !closest.is_empty() {
                println!("Closest matches:");
                for c in closest {
                    println!("  {} | {} | {}", c.player, c.squad, c.pos);
                }
            }
            return Ok(());
        }
    };

    let record = roster
        .get(idx)
        .with_context(|| format!("selected row {idx} is out of range"))?;
    let prediction = model
        .predict(record)
        .with_context(|| format!("score {}", record.player))?;

    println!("Player: {}", record.player);
    println!("Team: {}", record.squad.as_deref().unwrap_or("N/A"));
    println!("Position: {}", record.pos.as_deref().unwrap_or("N/A"));
    println!(
        "Predicted good performance (proxy): {}",
        u8::from(prediction.label)
    );
    println!("Probability (class 1): {:.3}", prediction.probability);

    let others: Vec<_> = resolution
        .candidates()
        .iter()
        .filter(|c| c.idx != idx)
        .take(args.top_k)
        .collect();
    if !others.is_empty() {
        println!("\nOther matches found:");
        for c in others {
            println!("  {} | {} | {}", c.player, c.squad, c.pos);
        }
    }
    Ok(())
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
