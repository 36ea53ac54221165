//! Board module.
//!
//! The board is the immutable terrain the rovers drive on, plus its coarse overview map.

pub mod board;
pub mod low_resolution;

pub use board::*;
pub use low_resolution::*;
