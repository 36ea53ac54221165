/// Main configuration module.
/// 
/// Re-exports the gameplay constants and the option structs built from them.
pub mod game;
pub mod options;

pub use options::{GamePlayOptions, GameStartOptions};
