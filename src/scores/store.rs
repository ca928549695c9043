use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// How many records the store keeps after each insert.
pub const MAX_RECORDS: usize = 10;

const APP_DIR: &str = ".2048";
const SCORES_FILE: &str = "scores.json";

/// One finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub username: String,
    pub score: u64,
    pub grid_size: usize,
    /// Round length in milliseconds.
    pub duration: u64,
    /// Unix seconds at which the round ended.
    pub completed_at: u64,
}

impl RoundRecord {
    /// Record a round that just finished, stamped with the current time.
    pub fn new(username: impl Into<String>, score: u64, grid_size: usize, duration: Duration) -> Self {
        RoundRecord {
            username: username.into(),
            score,
            grid_size,
            duration: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            completed_at: now_unix_seconds(),
        }
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration)
    }
}

impl fmt::Display for RoundRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} - {} - {}",
            self.username, self.score, self.completed_at, self.grid_size, self.duration
        )
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ScoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed, score-ranked list of finished rounds.
#[derive(Debug, Clone)]
pub struct ScoreStore {
    path: PathBuf,
    records: Vec<RoundRecord>,
}

impl ScoreStore {
    /// Load the history at `path`. Never fails: a missing or corrupt file
    /// yields an empty history.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut records = load_records(&path);
        sort_records(&mut records);
        ScoreStore { path, records }
    }

    /// Open the per-user history at [`default_path`], creating its directory.
    ///
    /// A directory that cannot be created is only logged; the failure shows
    /// up again from [`ScoreStore::add`] when the history is written.
    pub fn open_default() -> Self {
        Self::open_creating_dir(default_path())
    }

    fn open_creating_dir(path: PathBuf) -> Self {
        if let Some(dir) = path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!("could not create score directory {}: {e}", dir.display());
            }
        }
        Self::open(path)
    }

    /// Insert a record, keep the best [`MAX_RECORDS`], and persist.
    ///
    /// The in-memory ranking is updated even if writing the file fails.
    pub fn add(&mut self, record: RoundRecord) -> Result<(), ScoreError> {
        debug!("recording round: {record}");
        self.records.push(record);
        sort_records(&mut self.records);
        self.records.truncate(MAX_RECORDS);
        self.save()
    }

    /// Copy of the ranked history, best first.
    pub fn top_scores(&self) -> Vec<RoundRecord> {
        self.records.clone()
    }

    /// Best records for one board size, best first.
    pub fn top_scores_for_size(&self, grid_size: usize) -> Vec<RoundRecord> {
        self.records
            .iter()
            .filter(|r| r.grid_size == grid_size)
            .take(MAX_RECORDS)
            .cloned()
            .collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), ScoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// `$HOME/.2048/scores.json`, falling back to `USERPROFILE`, then the working directory.
pub fn default_path() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(APP_DIR).join(SCORES_FILE)
}

fn now_unix_seconds() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

// Stable, so equal scores keep insertion order.
fn sort_records(records: &mut [RoundRecord]) {
    records.sort_by(|a, b| b.score.cmp(&a.score));
}

fn load_records(path: &Path) -> Vec<RoundRecord> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("no score history at {}", path.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("could not read score history {}: {e}", path.display());
            return Vec::new();
        }
    };
    if text.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str(&text) {
        Ok(records) => records,
        Err(e) => {
            warn!("ignoring corrupt score history {}: {e}", path.display());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(name: &str, score: u64, grid_size: usize) -> RoundRecord {
        RoundRecord {
            username: name.to_string(),
            score,
            grid_size,
            duration: score * 10,
            completed_at: 1_700_000_000,
        }
    }

    fn scratch() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.json");
        (dir, path)
    }

    #[test]
    fn missing_file_is_empty_history() {
        let (_dir, path) = scratch();
        let store = ScoreStore::open(&path);
        assert!(store.top_scores().is_empty());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn corrupt_file_is_empty_history() {
        let (_dir, path) = scratch();
        fs::write(&path, "{not json").unwrap();
        assert!(ScoreStore::open(&path).top_scores().is_empty());
        fs::write(&path, "null").unwrap();
        assert!(ScoreStore::open(&path).top_scores().is_empty());
        fs::write(&path, "").unwrap();
        assert!(ScoreStore::open(&path).top_scores().is_empty());
    }

    #[test]
    fn loads_and_sorts_existing_file() {
        let (_dir, path) = scratch();
        fs::write(
            &path,
            r#"[{"username":"user1","score":1000,"gridSize":4,"duration":60000,"completedAt":1672531200},
                {"username":"user2","score":2000,"gridSize":4,"duration":120000,"completedAt":1672531200}]"#,
        )
        .unwrap();
        let scores = ScoreStore::open(&path).top_scores();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].username, "user2");
        assert_eq!(scores[0].duration(), Duration::from_secs(120));
        assert_eq!(scores[1].score, 1000);
    }

    #[test]
    fn add_sorts_descending_and_persists() {
        let (_dir, path) = scratch();
        let mut store = ScoreStore::open(&path);
        store.add(record("user1", 1000, 4)).unwrap();
        store.add(record("user2", 2000, 4)).unwrap();
        store.add(record("user3", 1500, 4)).unwrap();

        let scores: Vec<u64> = store.top_scores().iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![2000, 1500, 1000]);

        let reopened = ScoreStore::open(&path);
        assert_eq!(reopened.top_scores(), store.top_scores());
    }

    #[test]
    fn keeps_only_top_ten() {
        let (_dir, path) = scratch();
        let mut store = ScoreStore::open(&path);
        for i in 1..=12 {
            store.add(record(&format!("user{i}"), i * 100, 4)).unwrap();
        }
        let scores = store.top_scores();
        assert_eq!(scores.len(), MAX_RECORDS);
        assert_eq!(scores[0].score, 1200);
        assert_eq!(scores[9].score, 300);
        assert_eq!(ScoreStore::open(&path).top_scores().len(), MAX_RECORDS);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let (_dir, path) = scratch();
        let mut store = ScoreStore::open(&path);
        store.add(record("first", 500, 4)).unwrap();
        store.add(record("second", 500, 4)).unwrap();
        let names: Vec<String> = store.top_scores().into_iter().map(|r| r.username).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn filters_by_grid_size() {
        let (_dir, path) = scratch();
        let mut store = ScoreStore::open(&path);
        store.add(record("a", 300, 4)).unwrap();
        store.add(record("b", 900, 5)).unwrap();
        store.add(record("c", 600, 4)).unwrap();
        let four: Vec<u64> = store.top_scores_for_size(4).iter().map(|r| r.score).collect();
        assert_eq!(four, vec![600, 300]);
        assert_eq!(store.top_scores_for_size(5).len(), 1);
        assert!(store.top_scores_for_size(3).is_empty());
    }

    #[test]
    fn add_creates_missing_parent_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("scores.json");
        let mut store = ScoreStore::open(&path);
        store.add(record("user", 64, 2)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unwritable_home_still_opens() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        fs::write(&home, "a regular file, not a directory").unwrap();
        let path = home.join(APP_DIR).join(SCORES_FILE);

        let mut store = ScoreStore::open_creating_dir(path.clone());
        assert!(store.top_scores().is_empty());
        assert_eq!(store.path(), path.as_path());

        // the write fails, the ranking is still kept in memory
        assert!(matches!(store.add(record("user", 128, 4)), Err(ScoreError::Io(_))));
        assert_eq!(store.top_scores().len(), 1);
    }

    #[test]
    fn record_display_lists_fields() {
        let r = RoundRecord::new("user", 500, 4, Duration::from_millis(30_000));
        let s = r.to_string();
        assert!(s.starts_with("user - 500 - "));
        assert!(s.ends_with(" - 4 - 30000"));
        assert!(r.completed_at > 0);
    }
}
