use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use game_2048::scores::{self, ScoreStore};

#[derive(Debug, Parser)]
#[command(name = "scores", about = "Show the best finished 2048 rounds")]
struct Args {
    /// Score history file (defaults to ~/.2048/scores.json)
    #[arg(long, env = "GAME_2048_SCORES", value_name = "FILE")]
    scores: Option<PathBuf>,

    /// Only show rounds played on this board size
    #[arg(short, long)]
    size: Option<usize>,

    /// Print the records as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let path = args.scores.unwrap_or_else(scores::default_path);
    let store = ScoreStore::open(&path);
    let records = match args.size {
        Some(size) => store.top_scores_for_size(size),
        None => store.top_scores(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No rounds recorded in {}", path.display());
        return Ok(());
    }
    println!("{:>4}  {:<16} {:>8} {:>5} {:>9}", "rank", "player", "score", "size", "time");
    for (i, r) in records.iter().enumerate() {
        println!(
            "{:>4}  {:<16} {:>8} {:>5} {:>8.1}s",
            i + 1,
            r.username,
            r.score,
            format!("{0}x{0}", r.grid_size),
            r.duration().as_secs_f64()
        );
    }
    Ok(())
}
