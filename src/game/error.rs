//! Errors surfaced by the game engine.
//!
//! Game-rule outcomes (driving off the board, running low on battery) are not errors;
//! they come back as a successful [`crate::game::types::MoveResult`].

use thiserror::Error;

use crate::game::entities::PlayerToken;
use crate::game::types::GameState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("board {width}x{height} is too small, both dimensions must be at least 3")]
    BoardTooSmall { width: usize, height: usize },

    #[error("invalid game options: {0}")]
    InvalidOptions(&'static str),

    #[error("operation not allowed while the game is {current}")]
    InvalidGameState { current: GameState },

    #[error("the game is full ({max} players)")]
    TooManyPlayers { max: usize },

    #[error("unrecognized player token {0}")]
    UnrecognizedToken(PlayerToken),

    /// Another update to the same player won the race. Retry the whole operation.
    #[error("player {0} was modified concurrently")]
    UnableToUpdatePlayer(PlayerToken),

    #[error("no async runtime available to run the recharge scheduler")]
    RuntimeUnavailable,
}

pub type Result<T> = std::result::Result<T, GameError>;
