/// Game configuration constants.
/// 
/// This module defines the default gameplay parameters such as board dimensions,
/// battery limits, recharge cadence and visibility radii.
pub const BOARD_WIDTH: usize = 5;

/// Number of rows in the default board.
pub const BOARD_HEIGHT: usize = 5;

/// Smallest accepted board dimension (both width and height).
pub const MIN_BOARD_DIMENSION: usize = 3;

/// Map used when none is selected. Map 1 is flat terrain.
pub const DEFAULT_MAP_NUMBER: u32 = 1;

/// Battery every rover starts with, and the ceiling recharge tops up to.
pub const STARTING_BATTERY_LEVEL: u32 = 18_000;

/// Battery points restored per recharge tick.
pub const RECHARGE_POINTS_PER_TICK: u32 = 10;

/// Time (in milliseconds) between two recharge ticks.
pub const RECHARGE_INTERVAL_MS: u64 = 1_000;

/// Maximum number of players allowed in a game.
pub const MAX_PLAYERS: usize = 16;

/// Radius (Chebyshev distance) of the neighbourhood revealed to a rover after a join or move.
pub const PERSEVERANCE_VISIBILITY_RADIUS: usize = 2;

/// Radius revealed to the helicopter scout.
pub const INGENUITY_VISIBILITY_RADIUS: usize = 5;

/// Side length (in cells) of one block of the low-resolution overview map.
pub const LOW_RESOLUTION_BLOCK_SIZE: usize = 10;

/// Minimum time (in milliseconds) between two change notifications. Zero lets every change through.
pub const NOTIFICATION_INTERVAL_MS: u64 = 0;

/// Capacity of the notification broadcast channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;
