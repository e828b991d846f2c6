use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid board configuration")]
    InvalidConfig,
    #[error("Coordinates outside the board")]
    InvalidCoords,
    #[error("Board shape does not match the configured size")]
    InvalidBoardShape,
    #[error("Mine placement exhausted its attempt budget")]
    PlacementStalled,
}

pub type Result<T> = core::result::Result<T, GameError>;
