//! Headless demo.
//!
//! Starts one session on a rugged board, lets a few bots race to the target and prints the
//! winners as JSON. Set `RUST_LOG=info` (or `debug`) to follow the game.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::task::JoinSet;

use mission_control::game::entities::PlayerToken;
use mission_control::game::types::{Direction, Location, MoveMessage, Orientation};
use mission_control::{Game, GameError, GameManager, GamePlayOptions, GameStartOptions};

const BOT_NAMES: [&str; 4] = ["Sojourner", "Spirit", "Opportunity", "Curiosity"];
const RACE_TIMEOUT: Duration = Duration::from_secs(60);
const MOVE_DELAY: Duration = Duration::from_millis(20);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger from environment variable.
    env_logger::init();

    let start_options = GameStartOptions {
        width: 15,
        height: 15,
        map_number: 2,
        starting_battery_level: 40,
        recharge_interval: Duration::from_millis(250),
        ..GameStartOptions::default()
    };
    let recharge_interval = start_options.recharge_interval;
    let manager = GameManager::new(start_options)?;
    let game = manager.game();

    let mut bots = Vec::new();
    for name in BOT_NAMES {
        let joined = game.join(name)?;
        bots.push(Bot {
            name,
            token: joined.token,
            location: joined.location,
            orientation: joined.orientation,
        });
    }
    manager.play_game(GamePlayOptions { recharge_points_per_tick: 5, ..GamePlayOptions::default() })?;

    let mut race = JoinSet::new();
    for bot in bots {
        race.spawn(bot.drive(Arc::clone(&game), recharge_interval));
    }
    let finished = tokio::time::timeout(RACE_TIMEOUT, async {
        while let Some(result) = race.join_next().await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("[Demo] Bot stopped: {}", e),
                Err(e) => warn!("[Demo] Bot task failed: {}", e),
            }
        }
    })
    .await;
    if finished.is_err() {
        warn!("[Demo] Race timed out, {} rovers still driving", game.players().len());
    }

    game.end_game()?;
    println!("{}", serde_json::to_string_pretty(&game.winners())?);
    Ok(())
}

struct Bot {
    name: &'static str,
    token: PlayerToken,
    location: Location,
    orientation: Orientation,
}

impl Bot {
    /// Greedy driver: close the horizontal gap first, then the vertical one.
    async fn drive(mut self, game: Arc<Game>, recharge_interval: Duration) -> Result<(), GameError> {
        let target = game.target_location();
        loop {
            let direction = self.next_direction(target);
            match game.move_perseverance(self.token, direction) {
                Ok(result) => {
                    self.location = result.location;
                    self.orientation = result.orientation;
                    match result.message {
                        MoveMessage::ReachedTarget => {
                            info!("[Demo] {} made it with {} battery left", self.name, result.battery_level);
                            return Ok(());
                        }
                        MoveMessage::InsufficientBattery => tokio::time::sleep(recharge_interval).await,
                        _ => tokio::time::sleep(MOVE_DELAY).await,
                    }
                }
                // Lost a race with the recharge task, try again.
                Err(GameError::UnableToUpdatePlayer(_)) => tokio::task::yield_now().await,
                Err(e) => return Err(e),
            }
        }
    }

    fn next_direction(&self, target: Location) -> Direction {
        let wanted = if target.x > self.location.x {
            Orientation::East
        } else if target.x < self.location.x {
            Orientation::West
        } else if target.y > self.location.y {
            Orientation::North
        } else {
            Orientation::South
        };

        if wanted == self.orientation {
            Direction::Forward
        } else if self.orientation.turn(Direction::Right) == wanted {
            Direction::Right
        } else {
            Direction::Left
        }
    }
}
