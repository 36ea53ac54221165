//! In-memory engine for a multiplayer rover game.
//!
//! Players join a shared board, drive a battery-powered rover one command at a time and race
//! to a target cell. Web or CLI front ends talk to [`session::GameManager`] and [`game::Game`].

pub mod config;
pub mod game;
pub mod session;

pub use config::{GamePlayOptions, GameStartOptions};
pub use game::{Game, GameError};
pub use session::GameManager;
