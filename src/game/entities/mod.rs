//! Game entities module.
//!
//! This module organizes player entity logic.

pub mod player;

pub use player::*;
