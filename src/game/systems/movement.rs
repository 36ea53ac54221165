//! Player movement system.
//!
//! This module computes the next rover snapshot for a command. It never touches shared
//! state; the caller writes the result back with a compare-and-swap.

use crate::game::entities::Player;
use crate::game::grid::Board;
use crate::game::types::{Direction, Location, MoveMessage};

/// Battery spent on a turn or on bumping into the edge of the board.
pub const FLAT_MOVE_COST: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub player: Player,
    pub message: MoveMessage,
    pub reached_target: bool,
}

/// Apply `direction` to `player`.
/// Turning and leaving the board cost a flat point (saturating at zero); driving onto a cell
/// costs its difficulty, and nothing changes if the battery can't cover it.
pub fn move_player(player: &Player, direction: Direction, board: &Board, target: Location) -> MoveOutcome {
    let (next, message) = match direction {
        Direction::Left | Direction::Right => (
            Player {
                orientation: player.orientation.turn(direction),
                battery_level: player.battery_level.saturating_sub(FLAT_MOVE_COST),
                ..player.clone()
            },
            MoveMessage::TurnedOk,
        ),
        Direction::Forward | Direction::Reverse => {
            let desired = if direction == Direction::Forward {
                player.cell_in_front()
            } else {
                player.cell_in_back()
            };
            match board.cell(desired) {
                None => (
                    Player {
                        battery_level: player.battery_level.saturating_sub(FLAT_MOVE_COST),
                        ..player.clone()
                    },
                    MoveMessage::MovedOutOfBounds,
                ),
                Some(cell) if player.battery_level < cell.difficulty => {
                    (player.clone(), MoveMessage::InsufficientBattery)
                }
                Some(cell) => (
                    Player {
                        location: desired,
                        battery_level: player.battery_level - cell.difficulty,
                        ..player.clone()
                    },
                    MoveMessage::MovedOk,
                ),
            }
        }
    };

    let reached_target = next.location == target;
    MoveOutcome {
        player: next,
        message: if reached_target { MoveMessage::ReachedTarget } else { message },
        reached_target,
    }
}
