//! Score history for finished rounds.
//!
//! Records are kept as a JSON array on disk, ranked by score and capped at
//! [`MAX_RECORDS`]. A missing or unreadable history file is treated as an
//! empty history so gameplay never depends on it.

mod store;

pub use store::{
    RoundRecord,
    ScoreError,
    ScoreStore,
    MAX_RECORDS,
    default_path,
};
