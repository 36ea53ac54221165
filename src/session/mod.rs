//! Session management.
//!
//! Owns the game currently being played and replaces it when a new session starts.

pub mod manager;

pub use manager::GameManager;
