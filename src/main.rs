use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use game_2048::engine::{Board, MAX_SIZE, MIN_SIZE};
use game_2048::input::{self, Command};
use game_2048::scores::{RoundRecord, ScoreStore};
use log::{error, info};

#[derive(Debug, Parser)]
#[command(name = "game-2048", version, about = "Play 2048 in the terminal")]
struct Args {
    /// Board edge length (2..=10)
    #[arg(short, long, default_value_t = 4)]
    size: usize,

    /// Name recorded with finished rounds (defaults to $USER)
    #[arg(short, long)]
    name: Option<String>,

    /// Score history file (defaults to ~/.2048/scores.json)
    #[arg(long, env = "GAME_2048_SCORES", value_name = "FILE")]
    scores: Option<PathBuf>,

    /// Seed the tile generator for a reproducible game
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut board = match args.seed {
        Some(seed) => Board::from_seed(args.size, seed),
        None => Board::new(args.size),
    }
    .with_context(|| format!("board size must be in {MIN_SIZE}..={MAX_SIZE}"))?;
    let mut store = match &args.scores {
        Some(path) => ScoreStore::open(path),
        None => ScoreStore::open_default(),
    };
    let player = args
        .name
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "player".to_string());
    info!("playing as {player}, history at {}", store.path().display());

    println!("Move with wasd / hjkl / up down left right, r restarts, `size N` resizes, q quits.");
    render(&board);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match input::parse_key(&line) {
            Some(Command::Quit) => break,
            Some(Command::Restart) => {
                board.reinit(board.size())?;
                render(&board);
            }
            Some(Command::Resize(size)) => match board.reinit(size) {
                Ok(()) => {
                    print_top_scores(&store, size);
                    render(&board);
                }
                Err(e) => println!("{e}; keeping the current round"),
            },
            Some(Command::Move(dir)) => {
                if !board.make_move(dir) {
                    println!("(nothing moves {dir:?})");
                    continue;
                }
                render(&board);
                if board.is_game_over() {
                    finish_round(&mut board, &mut store, &player)?;
                }
            }
            None => println!("unknown key {:?}", line.trim()),
        }
    }
    Ok(())
}

fn render(board: &Board) {
    println!();
    print!("{board}");
    println!(
        "score: {} | best tile: {} | time: {}s",
        board.score(),
        board.highest_tile(),
        board.elapsed().as_secs()
    );
}

fn finish_round(board: &mut Board, store: &mut ScoreStore, player: &str) -> anyhow::Result<()> {
    let record = RoundRecord::new(player, board.score(), board.size(), board.elapsed());
    println!("Game over! Final score {}.", record.score);
    if let Err(e) = store.add(record) {
        error!("could not save score history to {}: {e}", store.path().display());
    }
    print_top_scores(store, board.size());
    board.reinit(board.size())?;
    render(board);
    Ok(())
}

fn print_top_scores(store: &ScoreStore, size: usize) {
    println!("Top scores for {size}x{size}:");
    for (rank, r) in store.top_scores_for_size(size).iter().enumerate() {
        println!("{:>2}. {r}", rank + 1);
    }
}
