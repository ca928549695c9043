//! game-2048: an N×N 2048 board engine plus a small score history
//!
//! This crate provides:
//! - A `Board` type owning the grid, score and round clock (`engine` module)
//! - A JSON-backed top-10 store of finished rounds (`scores` module)
//! - Keyboard-to-direction mapping for front ends (`input` module)
//!
//! Quick start:
//! ```
//! use game_2048::engine::{Board, Move};
//!
//! // Deterministic board with a seeded RNG
//! let mut board = Board::from_seed(4, 42).unwrap();
//! let _moved = board.make_move(Move::Left);
//! assert!(board.score() % 2 == 0);
//! ```
//!
//! Full loop (simplest possible)
//! ```
//! use game_2048::engine::{Board, Move};
//!
//! let mut board = Board::from_seed(3, 123).unwrap();
//! let mut moves = 0u32;
//! while board.has_valid_moves() && moves < 8 {
//!     let dir = Move::ALL[moves as usize % 4];
//!     board.make_move(dir);
//!     moves += 1;
//! }
//! println!("{board}score: {}", board.score());
//! ```
//!
pub mod engine;
pub mod input;
pub mod scores;
