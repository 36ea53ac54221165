use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::game::entities::PlayerToken;

/// Board coordinate. Cells on the board satisfy `1 <= x <= width` and `1 <= y <= height`;
/// a location computed by a move may fall outside that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance, the metric used for visibility.
    pub fn distance(&self, other: Location) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    fn step(self, orientation: Orientation, amount: i32) -> Location {
        match orientation {
            Orientation::North => Location::new(self.x, self.y + amount),
            Orientation::East => Location::new(self.x + amount, self.y),
            Orientation::South => Location::new(self.x, self.y - amount),
            Orientation::West => Location::new(self.x - amount, self.y),
        }
    }

    pub fn ahead(self, orientation: Orientation) -> Location {
        self.step(orientation, 1)
    }

    pub fn behind(self, orientation: Orientation) -> Location {
        self.step(orientation, -1)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Heading of a rover. North points towards increasing `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    /// Rotates 90 degrees for `Left`/`Right`; any other direction keeps the heading.
    pub fn turn(self, direction: Direction) -> Orientation {
        match (self, direction) {
            (Orientation::North, Direction::Right) | (Orientation::South, Direction::Left) => Orientation::East,
            (Orientation::East, Direction::Right) | (Orientation::West, Direction::Left) => Orientation::South,
            (Orientation::South, Direction::Right) | (Orientation::North, Direction::Left) => Orientation::West,
            (Orientation::West, Direction::Right) | (Orientation::East, Direction::Left) => Orientation::North,
            (_, Direction::Forward | Direction::Reverse) => self,
        }
    }
}

/// Command issued to a rover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Left,
    Right,
    Reverse,
}

impl Direction {
    pub fn is_turn(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// One board square and the battery it costs to drive onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub location: Location,
    pub difficulty: u32,
}

/// One block of the coarse overview map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowResolutionCell {
    pub average_difficulty: u32,
    pub lower_left: Location,
    pub upper_right: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    Joining,
    Playing,
    GameOver,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::Joining => "Joining",
            GameState::Playing => "Playing",
            GameState::GameOver => "GameOver",
        };
        f.write_str(name)
    }
}

/// Outcome text of a move. These are game-rule outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveMessage {
    TurnedOk,
    MovedOk,
    MovedOutOfBounds,
    InsufficientBattery,
    ReachedTarget,
}

impl MoveMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveMessage::TurnedOk => "Turned OK",
            MoveMessage::MovedOk => "Moved OK",
            MoveMessage::MovedOutOfBounds => {
                "Looks like you tried to move beyond the borders of the game."
            }
            MoveMessage::InsufficientBattery => {
                "Insufficient battery to make move.  Wait and recharge your battery."
            }
            MoveMessage::ReachedTarget => "You made it to the target!",
        }
    }
}

impl fmt::Display for MoveMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MoveMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Everything a newly joined player needs to start driving.
#[derive(Debug, Clone, Serialize)]
pub struct JoinResult {
    pub token: PlayerToken,
    pub location: Location,
    pub orientation: Orientation,
    pub battery_level: u32,
    pub target_location: Location,
    pub neighbors: Vec<Cell>,
    pub low_resolution_map: Vec<LowResolutionCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveResult {
    pub location: Location,
    pub battery_level: u32,
    pub orientation: Orientation,
    pub neighbors: Vec<Cell>,
    pub message: MoveMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_turns_cycle_clockwise() {
        let mut heading = Orientation::North;
        let mut seen = vec![];
        for _ in 0..4 {
            heading = heading.turn(Direction::Right);
            seen.push(heading);
        }
        assert_eq!(
            seen,
            vec![Orientation::East, Orientation::South, Orientation::West, Orientation::North]
        );
    }

    #[test]
    fn left_undoes_right() {
        for heading in Orientation::ALL {
            assert_eq!(heading.turn(Direction::Right).turn(Direction::Left), heading);
        }
    }

    #[test]
    fn forward_and_reverse_do_not_turn() {
        assert_eq!(Orientation::West.turn(Direction::Forward), Orientation::West);
        assert_eq!(Orientation::West.turn(Direction::Reverse), Orientation::West);
    }

    #[test]
    fn steps_follow_heading() {
        let origin = Location::new(3, 3);
        assert_eq!(origin.ahead(Orientation::North), Location::new(3, 4));
        assert_eq!(origin.ahead(Orientation::East), Location::new(4, 3));
        assert_eq!(origin.behind(Orientation::South), Location::new(3, 4));
        assert_eq!(origin.behind(Orientation::East), Location::new(2, 3));
    }

    #[test]
    fn messages_serialize_as_text() {
        let json = serde_json::to_string(&MoveMessage::ReachedTarget).unwrap();
        assert_eq!(json, "\"You made it to the target!\"");
    }
}
