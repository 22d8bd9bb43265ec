use thiserror::Error;

/// Every rejection leaves the game state untouched.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Tile values must be powers of two")]
    InvalidTileValue,
    #[error("Invalid direction")]
    InvalidDirection,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Waiting for a purge target")]
    Targeting,
    #[error("No purge target is being selected")]
    NotTargeting,
    #[error("Not enough energy")]
    InsufficientEnergy,
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Invalid rules: {0}")]
    InvalidRules(&'static str),
}

pub type Result<T> = core::result::Result<T, GameError>;
