//! Error taxonomy for the engine.

use std::fmt;

/// Why an operation on a game was rejected.
///
/// Every rejected move leaves the session untouched; the caller may retry
/// with a corrected request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Coordinate lies outside the board
    OutOfBounds { row: usize, col: usize },
    /// Point is not empty
    Occupied { row: usize, col: usize },
    /// Placed group would have no liberties after captures
    Suicide { row: usize, col: usize },
    /// Move recreates the position before the opponent's last move
    KoViolation { row: usize, col: usize },
    /// Move submitted for the side that is not to play
    NotYourTurn,
    /// Game already finished
    GameOver,
    /// Caller does not own the game
    NotAuthorized,
    /// No game with this id
    NotFound(u64),
    /// Another request holds the game
    SessionBusy(u64),
    /// Board size outside the supported set
    InvalidBoardSize(usize),
    /// A game with this id already exists
    Conflict(u64),
    /// Session could not be encoded or decoded, or is not a consistent game
    Storage(String),
    /// Automated opponent misbehaved; recovered internally as a pass
    StrategyFault(String),
}

impl std::error::Error for GameError {}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::OutOfBounds { row, col } => {
                write!(f, "Illegal move: ({row}, {col}) is off the board")
            }
            GameError::Occupied { row, col } => {
                write!(f, "Illegal move: ({row}, {col}) is not empty")
            }
            GameError::Suicide { row, col } => write!(f, "Illegal move: suicide at ({row}, {col})"),
            GameError::KoViolation { row, col } => {
                write!(f, "Illegal move: ({row}, {col}) retakes ko")
            }
            GameError::NotYourTurn => write!(f, "Not your turn"),
            GameError::GameOver => write!(f, "Game is not active"),
            GameError::NotAuthorized => write!(f, "Not authorized for this game"),
            GameError::NotFound(id) => write!(f, "Game {id} not found"),
            GameError::SessionBusy(id) => write!(f, "Game {id} is busy, retry later"),
            GameError::InvalidBoardSize(size) => write!(f, "Unsupported board size {size}"),
            GameError::Conflict(id) => write!(f, "Game {id} already exists"),
            GameError::Storage(reason) => write!(f, "Storage error: {reason}"),
            GameError::StrategyFault(reason) => write!(f, "Opponent fault: {reason}"),
        }
    }
}
