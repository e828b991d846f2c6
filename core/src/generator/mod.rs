use crate::*;
pub use random::*;

mod random;

/// Places the mines for a new game, anchored at the player's first
/// revealed tile.
pub trait BoardGenerator {
    fn generate(&mut self, config: &GameConfig, start: Coord2) -> Result<Board>;
}

/// Generator that hands out a prebuilt board, for scripted layouts and
/// deterministic replays. Unlike [`FairRandomGenerator`] it cannot promise a
/// safe first click.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedBoardGenerator {
    board: Board,
}

impl FixedBoardGenerator {
    pub fn new(board: Board) -> Self {
        Self { board }
    }
}

impl BoardGenerator for FixedBoardGenerator {
    fn generate(&mut self, config: &GameConfig, start: Coord2) -> Result<Board> {
        if self.board.size() != config.size() {
            return Err(GameError::InvalidBoardShape);
        }
        self.board.validate_coords(start)?;
        Ok(self.board.clone())
    }
}
