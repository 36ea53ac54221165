use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use log::{info, warn};
use tokio::sync::broadcast;

use crate::config::game::EVENT_CHANNEL_CAPACITY;
use crate::config::options::{GamePlayOptions, GameStartOptions};
use crate::game::error::Result;
use crate::game::notify::GameEvent;
use crate::game::state::Game;
use crate::game::types::GameState;

/// Holds the current [`Game`] and the channel observers listen on. Subscriptions survive
/// game replacement: every game the manager creates publishes on the same channel.
pub struct GameManager {
    game: RwLock<Arc<Game>>,
    start_options: RwLock<GameStartOptions>,
    created_on: SystemTime,
    events: broadcast::Sender<GameEvent>,
}

impl GameManager {
    pub fn new(start_options: GameStartOptions) -> Result<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let game = Game::with_events(start_options.clone(), events.clone())?;
        info!("[GameManager] New game created");
        Ok(Self {
            game: RwLock::new(Arc::new(game)),
            start_options: RwLock::new(start_options),
            created_on: SystemTime::now(),
            events,
        })
    }

    /// The game being played right now. Callers keep a working handle even if a new game
    /// starts meanwhile, but the old one no longer recharges or notifies.
    pub fn game(&self) -> Arc<Game> {
        Arc::clone(&*self.game.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Options the current game was created with.
    pub fn start_options(&self) -> GameStartOptions {
        self.start_options.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// When this manager was created.
    pub fn created_on(&self) -> SystemTime {
        self.created_on
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Replaces the current game. The new game is built first, so invalid options leave the
    /// running game untouched.
    pub fn start_new_game(&self, start_options: GameStartOptions) -> Result<Arc<Game>> {
        let game = Arc::new(Game::with_events(start_options.clone(), self.events.clone())?);
        let map_number = game.map_number();

        let previous = {
            let mut current = self.game.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, Arc::clone(&game))
        };
        *self.start_options.write().unwrap_or_else(PoisonError::into_inner) = start_options;

        previous.dispose();
        warn!("[GameManager] Game ending {:?}", previous.play_options());

        let _ = self.events.send(GameEvent::NewGameStarted { map_number });
        info!("[GameManager] New game created");
        let _ = self.events.send(GameEvent::StateChanged { state: GameState::Joining });
        Ok(game)
    }

    pub fn play_game(&self, play_options: GamePlayOptions) -> Result<()> {
        self.game().play_game(play_options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::error::GameError;
    use std::time::Duration;

    fn options(seed: u64) -> GameStartOptions {
        GameStartOptions {
            recharge_interval: Duration::from_secs(3_600),
            seed: Some(seed),
            ..GameStartOptions::default()
        }
    }

    #[test]
    fn manager_starts_with_a_joinable_game() {
        let manager = GameManager::new(options(1)).unwrap();
        assert_eq!(manager.game().state(), GameState::Joining);
        assert_eq!(manager.start_options(), options(1));
        assert!(manager.created_on() <= SystemTime::now());
    }

    #[test]
    fn manager_rejects_invalid_first_game() {
        let result = GameManager::new(GameStartOptions { width: 1, ..options(1) });
        assert!(matches!(result, Err(GameError::BoardTooSmall { .. })));
    }

    #[tokio::test]
    async fn new_game_replaces_and_disposes_the_old_one() {
        let manager = GameManager::new(options(1)).unwrap();
        let old = manager.game();
        old.join("P1").unwrap();
        manager.play_game(GamePlayOptions::default()).unwrap();
        assert!(old.is_recharging());

        let mut events = manager.subscribe();
        let next_options = GameStartOptions { width: 9, height: 9, map_number: 2, ..options(2) };
        let fresh = manager.start_new_game(next_options.clone()).unwrap();

        assert!(Arc::ptr_eq(&fresh, &manager.game()));
        assert!(!old.is_recharging());
        assert_eq!(fresh.state(), GameState::Joining);
        assert!(fresh.players().is_empty());
        assert_eq!(manager.start_options(), next_options);
        assert_eq!(events.try_recv().unwrap(), GameEvent::NewGameStarted { map_number: 2 });
        assert_eq!(events.try_recv().unwrap(), GameEvent::StateChanged { state: GameState::Joining });

        // The old game is detached from the shared channel.
        old.join("P2").unwrap();
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn invalid_new_game_keeps_the_current_one() {
        let manager = GameManager::new(options(1)).unwrap();
        let current = manager.game();
        assert!(manager.start_new_game(GameStartOptions { height: 2, ..options(2) }).is_err());
        assert!(Arc::ptr_eq(&current, &manager.game()));
        assert_eq!(manager.start_options(), options(1));
    }

    #[test]
    fn subscribers_hear_the_current_game() {
        let manager = GameManager::new(options(1)).unwrap();
        let mut events = manager.subscribe();
        manager.game().join("P1").unwrap();
        assert_eq!(events.try_recv().unwrap(), GameEvent::StateChanged { state: GameState::Joining });
    }
}
