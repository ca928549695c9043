use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::time::{Duration, Instant};

/// Smallest supported board edge length.
pub const MIN_SIZE: usize = 2;
/// Largest supported board edge length.
pub const MAX_SIZE: usize = 10;

pub type Tile = u64;
pub type Score = u64;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Which lines this move walks, and whether tiles slide toward the
    /// high-index end of each line.
    #[inline]
    fn geometry(self) -> (Axis, bool) {
        match self {
            Move::Left => (Axis::Row, false),
            Move::Right => (Axis::Row, true),
            Move::Up => (Axis::Column, false),
            Move::Down => (Axis::Column, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Row,
    Column,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("board size must be between 2 and 10, got {size}")]
    InvalidSize { size: usize },
    #[error("tile value {value} is neither empty nor a power of two >= 2")]
    InvalidTile { value: Tile },
    #[error("row {row} has {len} cells, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
}

/// An N×N 2048 board together with the score and clock of the current round.
///
/// Cells are stored row-major; 0 marks an empty cell. The board owns its
/// random generator so that seeded boards replay identically.
#[derive(Clone)]
pub struct Board {
    size: usize,
    cells: Vec<Tile>,
    score: Score,
    started_at: Instant,
    rng: StdRng,
}

impl Board {
    /// Start a round on a `size`×`size` board seeded from OS entropy.
    ///
    /// ```
    /// use game_2048::engine::{Board, BoardError};
    /// let b = Board::new(4).unwrap();
    /// assert_eq!(b.count_empty(), 14);
    /// assert_eq!(Board::new(11).unwrap_err(), BoardError::InvalidSize { size: 11 });
    /// ```
    pub fn new(size: usize) -> Result<Self, BoardError> {
        Self::with_rng(size, StdRng::from_entropy())
    }

    /// Like [`Board::new`] but with a deterministic generator.
    pub fn from_seed(size: usize, seed: u64) -> Result<Self, BoardError> {
        Self::with_rng(size, StdRng::seed_from_u64(seed))
    }

    /// Start a round using the given generator for every future spawn.
    pub fn with_rng(size: usize, rng: StdRng) -> Result<Self, BoardError> {
        check_size(size)?;
        let mut board = Board {
            size,
            cells: Vec::new(),
            score: 0,
            started_at: Instant::now(),
            rng,
        };
        board.start_round(size);
        Ok(board)
    }

    /// Build a board holding exactly `cells` (rows top to bottom), score 0.
    ///
    /// No tiles are spawned. Intended for setting up positions in tests and
    /// tooling; gameplay should go through [`Board::new`].
    pub fn from_cells(cells: Vec<Vec<Tile>>) -> Result<Self, BoardError> {
        let size = cells.len();
        check_size(size)?;
        if let Some((row, len)) = cells.iter().map(Vec::len).enumerate().find(|&(_, len)| len != size) {
            return Err(BoardError::NotSquare { row, len, size });
        }
        let flat: Vec<Tile> = cells.into_iter().flatten().collect();
        if let Some(&value) = flat.iter().find(|&&v| v != 0 && (v < 2 || !v.is_power_of_two())) {
            return Err(BoardError::InvalidTile { value });
        }
        Ok(Board {
            size,
            cells: flat,
            score: 0,
            started_at: Instant::now(),
            rng: StdRng::from_entropy(),
        })
    }

    /// Throw away the current round and start a fresh one at `size`.
    ///
    /// On error the board is left exactly as it was.
    pub fn reinit(&mut self, size: usize) -> Result<(), BoardError> {
        check_size(size)?;
        self.start_round(size);
        Ok(())
    }

    fn start_round(&mut self, size: usize) {
        self.size = size;
        self.cells = vec![0; size * size];
        self.score = 0;
        self.started_at = Instant::now();
        self.add_random_tile();
        self.add_random_tile();
        debug!("new round on {size}x{size} board");
    }

    /// Slide/merge tiles in `dir` without spawning. Returns true if any cell changed.
    ///
    /// ```
    /// use game_2048::engine::{Board, Move};
    /// let mut b = Board::from_cells(vec![vec![2, 2], vec![0, 4]]).unwrap();
    /// assert!(b.shift(Move::Left));
    /// assert_eq!(b.grid(), vec![vec![4, 0], vec![4, 0]]);
    /// assert_eq!(b.score(), 4);
    /// ```
    pub fn shift(&mut self, dir: Move) -> bool {
        let (axis, toward_end) = dir.geometry();
        let n = self.size;
        let mut moved = false;
        let mut line = Vec::with_capacity(n);
        for l in 0..n {
            line.clear();
            line.extend((0..n).map(|p| self.cells[line_index(n, axis, l, p)]));
            let (next, gained) = slide_line(&line, toward_end);
            if next == line {
                continue;
            }
            for (p, &v) in next.iter().enumerate() {
                self.cells[line_index(n, axis, l, p)] = v;
            }
            self.score += gained;
            moved = true;
        }
        moved
    }

    /// Perform a move then insert a random tile if the move changed the board.
    ///
    /// ```
    /// use game_2048::engine::{Board, Move};
    /// let mut b = Board::from_seed(4, 1).unwrap();
    /// let before = b.count_empty();
    /// if b.make_move(Move::Up) {
    ///     assert!(b.count_empty() <= before);
    /// }
    /// ```
    pub fn make_move(&mut self, dir: Move) -> bool {
        let moved = self.shift(dir);
        if moved {
            self.add_random_tile();
        }
        moved
    }

    /// Put a 2 (90%) or 4 (10%) into a uniformly chosen empty cell.
    ///
    /// Returns false, leaving the board untouched, when no cell is empty.
    pub fn add_random_tile(&mut self) -> bool {
        let empty: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(i, _)| i)
            .collect();
        if empty.is_empty() {
            return false;
        }
        let idx = empty[self.rng.gen_range(0..empty.len())];
        self.cells[idx] = generate_random_tile(&mut self.rng);
        true
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        !self.cells.contains(&0)
    }

    /// True if some direction would change the board.
    pub fn has_valid_moves(&self) -> bool {
        let n = self.size;
        for row in 0..n {
            for col in 0..n {
                let v = self.cells[row * n + col];
                if v == 0 {
                    return true;
                }
                if col + 1 < n && self.cells[row * n + col + 1] == v {
                    return true;
                }
                if row + 1 < n && self.cells[(row + 1) * n + col] == v {
                    return true;
                }
            }
        }
        false
    }

    /// Return true if no legal moves remain.
    #[inline]
    pub fn is_game_over(&self) -> bool {
        !self.has_valid_moves()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    /// Time since the current round started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Owned copy of the grid, rows top to bottom.
    pub fn grid(&self) -> Vec<Vec<Tile>> {
        self.rows().map(<[Tile]>::to_vec).collect()
    }

    /// Borrowed view of each row, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        self.cells.chunks(self.size)
    }

    /// Value at (`row`, `col`), 0 if empty.
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> Tile {
        assert!(row < self.size && col < self.size, "cell ({row}, {col}) out of range");
        self.cells[row * self.size + col]
    }

    /// Return the highest tile value (e.g., 2048) present on the board.
    pub fn highest_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Count the number of empty cells on the board.
    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("size", &self.size)
            .field("cells", &self.cells)
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.highest_tile().to_string().len().max(4);
        for row in self.rows() {
            for (i, &v) in row.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                match v {
                    0 => write!(f, "{:>width$}", ".")?,
                    v => write!(f, "{v:>width$}")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn check_size(size: usize) -> Result<(), BoardError> {
    if (MIN_SIZE..=MAX_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(BoardError::InvalidSize { size })
    }
}

#[inline]
fn line_index(n: usize, axis: Axis, line: usize, pos: usize) -> usize {
    match axis {
        Axis::Row => line * n + pos,
        Axis::Column => pos * n + line,
    }
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 { 2 } else { 4 }
}

/// Compact, merge and re-pad one line. Returns the new line and the points earned.
///
/// Merging walks from the edge the tiles slide toward, so each tile takes
/// part in at most one merge: `[2, 2, 2, 2]` becomes `[4, 4, 0, 0]`.
fn slide_line(line: &[Tile], toward_end: bool) -> (Vec<Tile>, Score) {
    let mut tiles: Vec<Tile> = line.iter().copied().filter(|&v| v != 0).collect();
    if toward_end {
        tiles.reverse();
    }
    let mut out = Vec::with_capacity(line.len());
    let mut gained = 0;
    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] {
            // each spawn adds at most 4 to the board total, so this takes ~2^61 moves
            debug_assert!(tiles[i] <= Tile::MAX / 2);
            let merged = tiles[i] * 2;
            gained += merged;
            out.push(merged);
            i += 2;
        } else {
            out.push(tiles[i]);
            i += 1;
        }
    }
    out.resize(line.len(), 0);
    if toward_end {
        out.reverse();
    }
    (out, gained)
}
