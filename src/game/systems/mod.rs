pub mod movement;
pub mod recharge;

pub use movement::*;
pub use recharge::*;
