//! Option structs used to create and start a game.
//!
//! Defaults come from [`crate::config::game`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::game::*;

/// Everything needed to build a new [`crate::game::state::Game`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStartOptions {
    pub width: usize,
    pub height: usize,
    pub map_number: u32,
    pub starting_battery_level: u32,
    pub max_players: usize,
    pub perseverance_visibility_radius: usize,
    pub ingenuity_visibility_radius: usize,
    pub low_resolution_block_size: usize,
    pub recharge_interval: Duration,
    pub notification_interval: Duration,
    /// Seed for placement and orientation. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for GameStartOptions {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            map_number: DEFAULT_MAP_NUMBER,
            starting_battery_level: STARTING_BATTERY_LEVEL,
            max_players: MAX_PLAYERS,
            perseverance_visibility_radius: PERSEVERANCE_VISIBILITY_RADIUS,
            ingenuity_visibility_radius: INGENUITY_VISIBILITY_RADIUS,
            low_resolution_block_size: LOW_RESOLUTION_BLOCK_SIZE,
            recharge_interval: Duration::from_millis(RECHARGE_INTERVAL_MS),
            notification_interval: Duration::from_millis(NOTIFICATION_INTERVAL_MS),
            seed: None,
        }
    }
}

impl GameStartOptions {
    pub fn with_size(width: usize, height: usize) -> Self {
        Self { width, height, ..Self::default() }
    }
}

/// Options applied when the game moves from joining to playing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamePlayOptions {
    /// Replaces the battery ceiling (and every joined rover's charge) when set.
    pub starting_battery_level: Option<u32>,
    pub recharge_points_per_tick: u32,
}

impl Default for GamePlayOptions {
    fn default() -> Self {
        Self {
            starting_battery_level: None,
            recharge_points_per_tick: RECHARGE_POINTS_PER_TICK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_options_fill_missing_fields_from_defaults() {
        let options: GameStartOptions = serde_json::from_str(r#"{"width": 12, "seed": 7}"#).unwrap();
        assert_eq!(options.width, 12);
        assert_eq!(options.height, BOARD_HEIGHT);
        assert_eq!(options.seed, Some(7));
        assert_eq!(options.recharge_interval, Duration::from_millis(RECHARGE_INTERVAL_MS));
    }

    #[test]
    fn play_options_default_keeps_starting_battery() {
        let options = GamePlayOptions::default();
        assert_eq!(options.starting_battery_level, None);
        assert_eq!(options.recharge_points_per_tick, RECHARGE_POINTS_PER_TICK);
    }
}
