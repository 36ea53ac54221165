pub mod types;
pub mod error;
pub mod state;
pub mod registry;
pub mod notify;

pub mod entities;
pub mod grid;
pub mod systems;


pub use error::{GameError, Result};
pub use state::Game;
