use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::game::grid::Board;
use crate::game::types::{Location, Orientation};

/// Opaque credential issued on join. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct PlayerToken(Uuid);

// Same text as `Display`, so a token read off the wire translates back.
impl Serialize for PlayerToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl PlayerToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PlayerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.simple(), f)
    }
}

impl FromStr for PlayerToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(PlayerToken)
    }
}

/// Snapshot of one rover. Updates build a new value instead of mutating in place,
/// which is what lets the registry compare-and-swap whole snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub token: PlayerToken,
    pub name: String,
    pub location: Location,
    pub orientation: Orientation,
    pub battery_level: u32,
}

impl Player {
    pub fn new(name: impl Into<String>, location: Location, orientation: Orientation, battery_level: u32) -> Self {
        Self {
            token: PlayerToken::generate(),
            name: name.into(),
            location,
            orientation,
            battery_level,
        }
    }

    pub fn cell_in_front(&self) -> Location {
        self.location.ahead(self.orientation)
    }

    pub fn cell_in_back(&self) -> Location {
        self.location.behind(self.orientation)
    }
}

/// Generate new player with a random free position and heading.
/// Returns `None` when every candidate cell is taken.
pub fn spawn_random_player<R: Rng + ?Sized>(
    board: &Board,
    occupied: &HashSet<Location>,
    target: Location,
    name: &str,
    battery_level: u32,
    rng: &mut R,
) -> Option<Player> {
    let Some(location) = board.place_new_player(occupied, target, rng) else {
        warn!("[Game] Unable to place player {}: no free cell.", name);
        return None;
    };
    let orientation = Orientation::ALL[rng.random_range(0..Orientation::ALL.len())];
    Some(Player::new(name, location, orientation, battery_level))
}
