use std::collections::VecDeque;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Lifecycle of a single game.
///
/// Valid transitions:
/// - Uninitialized -> InProgress (first reveal, board generated)
/// - InProgress -> Won
/// - InProgress -> Lost
/// - any state -> Uninitialized (restart)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// No board exists yet; the first reveal generates one.
    Uninitialized,
    InProgress,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::Uninitialized)
    }

    /// Indicates the game has ended and no moves are accepted anymore.
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

/// One game from first click to win or loss, plus restarts.
///
/// Owns the board outright; the presentation layer pulls snapshots through
/// the accessor methods and feeds input through [`reveal`](Self::reveal),
/// [`flag`](Self::flag), and [`restart`](Self::restart).
#[derive(Clone, Debug)]
pub struct GameSession<G = FairRandomGenerator> {
    config: GameConfig,
    generator: G,
    board: Option<Board>,
    grid: Array2<TileState>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    state: GameState,
    started_at: Option<Instant>,
}

impl GameSession<FairRandomGenerator> {
    pub fn new(config: GameConfig) -> Self {
        Self::with_generator(config, FairRandomGenerator::new())
    }

    /// Deterministic session for replays and tests.
    pub fn from_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_generator(config, FairRandomGenerator::from_seed(seed))
    }
}

impl<G: BoardGenerator> GameSession<G> {
    pub fn with_generator(config: GameConfig, generator: G) -> Self {
        let (rows, cols) = config.size();
        Self {
            config,
            generator,
            board: None,
            grid: Array2::from_elem((rows as usize, cols as usize), TileState::Hidden),
            revealed_count: 0,
            flagged_count: 0,
            state: GameState::Uninitialized,
            started_at: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn size(&self) -> Coord2 {
        self.config.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// How many mines have not been flagged yet.
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.flagged_count as isize)
    }

    /// Reveal count at which the session transitions to [`GameState::Won`].
    pub fn win_target(&self) -> CellCount {
        self.config.win_target()
    }

    /// Monotonic anchor taken when the board was generated. Cleared on loss
    /// and restart; the caller computes elapsed time from it.
    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn tile_at(&self, coords: Coord2) -> TileState {
        self.grid[coords.to_nd_index()]
    }

    /// Reveals the tile at `coords`.
    ///
    /// The first reveal of a session generates the board anchored at that
    /// tile, so it can never hit a mine (with the default generator). Reveals
    /// after the game has ended are accepted and ignored.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;

        if self.state.is_final() {
            return Ok(RevealOutcome::NoChange);
        }
        if self.state.is_initial() {
            return self.start_game(coords);
        }

        match self.grid[coords.to_nd_index()] {
            TileState::Revealed(_) | TileState::Flagged => Ok(RevealOutcome::NoChange),
            TileState::Hidden => Ok(self.reveal_hidden(coords)),
        }
    }

    /// Flags a hidden tile. Flags are permanent: there is no unflag, and
    /// revealed tiles cannot be flagged.
    pub fn flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.validate_coords(coords)?;

        if !matches!(self.state, GameState::InProgress) {
            return Ok(FlagOutcome::NoChange);
        }

        Ok(match self.grid[coords.to_nd_index()] {
            TileState::Hidden => {
                self.grid[coords.to_nd_index()] = TileState::Flagged;
                self.flagged_count += 1;
                FlagOutcome::Flagged
            }
            TileState::Flagged | TileState::Revealed(_) => FlagOutcome::NoChange,
        })
    }

    /// Drops the board and returns the session to [`GameState::Uninitialized`],
    /// ready for a fresh first click.
    pub fn restart(&mut self) {
        self.board = None;
        self.grid.fill(TileState::Hidden);
        self.revealed_count = 0;
        self.flagged_count = 0;
        self.state = GameState::Uninitialized;
        self.started_at = None;
        log::debug!("Session restarted");
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (rows, cols) = self.config.size();
        if coords.0 < rows && coords.1 < cols {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// First reveal: generate the board anchored at `coords` and open it. A
    /// failed generation leaves the session untouched in `Uninitialized`.
    fn start_game(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let board = self.generator.generate(&self.config, coords)?;
        if board.size() != self.config.size() {
            return Err(GameError::InvalidBoardShape);
        }
        log::debug!("Board generated from first reveal at {coords:?}");

        self.board = Some(board);
        self.state = GameState::InProgress;
        self.started_at = Some(Instant::now());
        Ok(self.reveal_hidden(coords))
    }

    /// Opens a hidden tile on an in-progress board, cascading from zeros and
    /// applying the loss/win transitions.
    fn reveal_hidden(&mut self, coords: Coord2) -> RevealOutcome {
        let Some(board) = self.board.as_ref() else {
            return RevealOutcome::NoChange;
        };

        match board.value_at(coords) {
            TileValue::Mine => {
                self.state = GameState::Lost;
                self.started_at = None;
                log::debug!("Mine hit at {coords:?}");
                RevealOutcome::HitMine
            }
            TileValue::Count(count) => {
                self.grid[coords.to_nd_index()] = TileState::Revealed(count);
                self.revealed_count += 1;
                if count == 0 {
                    self.revealed_count += reveal_cascade(board, &mut self.grid, coords);
                }

                if self.revealed_count >= self.config.win_target() {
                    self.state = GameState::Won;
                    RevealOutcome::Won
                } else {
                    RevealOutcome::Revealed
                }
            }
        }
    }
}

/// Breadth-first reveal of the zero-valued region around `start`, including
/// its numbered border. Flagged, already-revealed, and mine tiles are never
/// touched. Returns how many tiles were newly revealed, not counting `start`
/// itself.
///
/// Each coordinate is enqueued at most once because enqueueing happens only
/// on the Hidden -> Revealed edge, so the walk terminates on any board.
fn reveal_cascade(board: &Board, grid: &mut Array2<TileState>, start: Coord2) -> CellCount {
    let mut revealed: CellCount = 0;
    let mut queue = VecDeque::from([start]);

    while let Some(coords) = queue.pop_front() {
        for pos in board.iter_neighbors(coords) {
            if !grid[pos.to_nd_index()].is_hidden() {
                continue;
            }
            let TileValue::Count(count) = board.value_at(pos) else {
                continue;
            };

            grid[pos.to_nd_index()] = TileState::Revealed(count);
            revealed += 1;
            if count == 0 {
                queue.push_back(pos);
            }
        }
    }

    log::trace!("Cascade from {start:?} revealed {revealed} tiles");
    revealed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_session(
        size: Coord2,
        mines: &[Coord2],
        fairness: u8,
    ) -> GameSession<FixedBoardGenerator> {
        let config = GameConfig::new(size.0, size.1, mines.len() as CellCount)
            .unwrap()
            .with_fairness(fairness);
        let board = Board::from_mine_coords(size, mines).unwrap();
        GameSession::with_generator(config, FixedBoardGenerator::new(board))
    }

    #[test]
    fn first_reveal_starts_the_game() {
        let mut session = GameSession::from_seed(GameConfig::default(), 42);
        assert_eq!(session.state(), GameState::Uninitialized);
        assert_eq!(session.started_at(), None);

        let outcome = session.reveal((3, 3)).unwrap();

        assert!(outcome.has_update());
        assert_ne!(outcome, RevealOutcome::HitMine);
        assert!(!session.state().is_initial());
        assert!(session.started_at().is_some());
        assert!(session.revealed_count() >= 1);
        assert!(session.tile_at((3, 3)).is_revealed());
    }

    #[test]
    fn corner_reveal_cascades_the_whole_board_and_wins() {
        let mut session = fixed_session((8, 8), &[(7, 7)], 8);

        let outcome = session.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(session.revealed_count(), 63);
        assert_eq!(session.state(), GameState::Won);
        assert_eq!(session.tile_at((7, 7)), TileState::Hidden);
        assert_eq!(session.tile_at((7, 6)), TileState::Revealed(1));
        assert_eq!(session.tile_at((0, 7)), TileState::Revealed(0));
    }

    #[test]
    fn mine_hit_loses_and_freezes_the_session() {
        let mut session = fixed_session((3, 3), &[(1, 1)], 8);

        assert_eq!(session.reveal((0, 0)).unwrap(), RevealOutcome::Revealed);
        assert_eq!(session.revealed_count(), 1);

        let outcome = session.reveal((1, 1)).unwrap();
        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(session.state(), GameState::Lost);
        assert_eq!(session.revealed_count(), 1);
        assert_eq!(session.started_at(), None);
        assert_eq!(session.tile_at((1, 1)), TileState::Hidden);

        // frozen: further input is ignored
        assert_eq!(session.reveal((2, 2)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(session.flag((2, 2)).unwrap(), FlagOutcome::NoChange);
        assert_eq!(session.tile_at((2, 2)), TileState::Hidden);
    }

    #[test]
    fn flags_are_permanent_and_block_reveal() {
        let mut session = fixed_session((3, 3), &[(1, 1)], 8);
        session.reveal((0, 0)).unwrap();

        assert_eq!(session.flag((2, 2)).unwrap(), FlagOutcome::Flagged);
        assert_eq!(session.flag((2, 2)).unwrap(), FlagOutcome::NoChange);
        assert_eq!(session.flagged_count(), 1);
        assert_eq!(session.mines_left(), 0);

        assert_eq!(session.reveal((2, 2)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(session.tile_at((2, 2)), TileState::Flagged);

        // flagging a revealed tile does nothing
        assert_eq!(session.flag((0, 0)).unwrap(), FlagOutcome::NoChange);
    }

    #[test]
    fn cascade_stops_at_flagged_tiles() {
        // 5x1 strip: mine at the top, zeros at the bottom.
        let mut session = fixed_session((5, 1), &[(0, 0)], 8);

        assert_eq!(session.reveal((1, 0)).unwrap(), RevealOutcome::Revealed);
        session.flag((3, 0)).unwrap();

        assert_eq!(session.reveal((4, 0)).unwrap(), RevealOutcome::Revealed);
        assert_eq!(session.revealed_count(), 2);
        assert_eq!(session.tile_at((3, 0)), TileState::Flagged);
        assert_eq!(session.tile_at((2, 0)), TileState::Hidden);
    }

    #[test]
    fn revealing_a_revealed_tile_is_a_noop() {
        let mut session = fixed_session((3, 3), &[(1, 1)], 8);
        session.reveal((0, 0)).unwrap();

        assert_eq!(session.reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(session.revealed_count(), 1);
    }

    #[test]
    fn out_of_bounds_input_is_rejected_without_mutation() {
        let mut session = fixed_session((8, 8), &[(7, 7)], 8);

        assert_eq!(session.reveal((8, 0)), Err(GameError::InvalidCoords));
        assert_eq!(session.flag((0, 8)), Err(GameError::InvalidCoords));
        assert_eq!(session.state(), GameState::Uninitialized);
        assert_eq!(session.revealed_count(), 0);
    }

    #[test]
    fn flag_before_first_reveal_is_ignored() {
        let mut session = fixed_session((3, 3), &[(1, 1)], 8);

        assert_eq!(session.flag((0, 0)).unwrap(), FlagOutcome::NoChange);
        assert_eq!(session.tile_at((0, 0)), TileState::Hidden);
        assert_eq!(session.state(), GameState::Uninitialized);
    }

    #[test]
    fn restart_resets_to_a_fresh_uninitialized_session() {
        let mut session = fixed_session((8, 8), &[(7, 7)], 8);
        assert_eq!(session.reveal((0, 0)).unwrap(), RevealOutcome::Won);

        session.restart();

        assert_eq!(session.state(), GameState::Uninitialized);
        assert_eq!(session.revealed_count(), 0);
        assert_eq!(session.flagged_count(), 0);
        assert_eq!(session.started_at(), None);
        for row in 0..8 {
            for col in 0..8 {
                assert_eq!(session.tile_at((row, col)), TileState::Hidden);
            }
        }

        // and immediately playable again
        assert_eq!(session.reveal((0, 0)).unwrap(), RevealOutcome::Won);
    }

    #[test]
    fn mismatched_board_shape_is_an_error_not_a_panic() {
        let config = GameConfig::new(4, 4, 1).unwrap();
        let board = Board::from_mine_coords((3, 3), &[(2, 2)]).unwrap();
        let mut session = GameSession::with_generator(config, FixedBoardGenerator::new(board));

        assert_eq!(session.reveal((0, 0)), Err(GameError::InvalidBoardShape));
        assert_eq!(session.state(), GameState::Uninitialized);
        assert_eq!(session.revealed_count(), 0);
        // a coordinate valid for the config but not the undersized board
        assert_eq!(session.reveal((3, 3)), Err(GameError::InvalidBoardShape));
    }

    #[test]
    fn fixed_board_can_lose_on_the_first_click() {
        let mut session = fixed_session((3, 3), &[(1, 1)], 8);

        assert_eq!(session.reveal((1, 1)).unwrap(), RevealOutcome::HitMine);
        assert_eq!(session.state(), GameState::Lost);
        assert_eq!(session.revealed_count(), 0);
    }

    #[test]
    fn single_tile_reveals_win_at_the_target() {
        // 2x2 with two mines on the right column: win target is 4-2-1 = 1.
        let mut session = fixed_session((2, 2), &[(0, 1), (1, 1)], 8);
        assert_eq!(session.win_target(), 1);

        assert_eq!(session.reveal((0, 0)).unwrap(), RevealOutcome::Won);
        assert_eq!(session.revealed_count(), 1);
    }
}
