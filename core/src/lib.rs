use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use generator::*;
pub use session::*;
pub use tile::*;
pub use types::*;

mod board;
mod error;
mod generator;
mod session;
mod tile;
mod types;

/// Default bound on the mine-adjacency count tolerated around a placement
/// site (see [`FairRandomGenerator`]).
pub const DEFAULT_FAIRNESS: u8 = 5;

/// Immutable per-game parameters, passed explicitly through every engine
/// call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub rows: Coord,
    pub cols: Coord,
    pub mines: CellCount,
    /// Fairness bound for mine placement; a playability knob, not a
    /// correctness requirement.
    pub fairness: u8,
}

impl GameConfig {
    pub const fn new_unchecked(rows: Coord, cols: Coord, mines: CellCount, fairness: u8) -> Self {
        Self {
            rows,
            cols,
            mines,
            fairness,
        }
    }

    /// Validates dimensions and mine count; the board must keep at least one
    /// safe cell beyond the guaranteed first click.
    pub fn new(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidConfig);
        }
        if mines == 0 || mines >= mult(rows, cols) {
            return Err(GameError::InvalidConfig);
        }
        Ok(Self::new_unchecked(rows, cols, mines, DEFAULT_FAIRNESS))
    }

    pub fn with_fairness(mut self, fairness: u8) -> Self {
        self.fairness = fairness;
        self
    }

    pub const fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }

    /// Reveals required to win. The guaranteed-safe first tile is discounted
    /// from the denominator even though its own reveal still counts toward
    /// the total.
    pub const fn win_target(&self) -> CellCount {
        self.total_cells() - self.mines - 1
    }
}

impl Default for GameConfig {
    /// The stock 16x10 board with 30 mines.
    fn default() -> Self {
        Self::new_unchecked(16, 10, 30, DEFAULT_FAIRNESS)
    }
}

/// Outcome of a flag request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Flagged,
}

impl FlagOutcome {
    /// Whether this outcome changed anything the presentation layer shows.
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Flagged => true,
        }
    }
}

/// Outcome of a reveal request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    /// Whether this outcome changed anything the presentation layer shows.
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}
