//! The game engine.
//!
//! A [`Game`] owns the board, the target, the active players and the winners, and enforces
//! the lifecycle `Joining -> Playing -> GameOver`. Every method takes `&self`: wrap the game in
//! an `Arc` and call it from as many threads as needed.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::broadcast;

use crate::config::options::{GamePlayOptions, GameStartOptions};
use crate::game::entities::{Player, PlayerToken, spawn_random_player};
use crate::game::error::{GameError, Result};
use crate::game::grid::{Board, low_resolution_map};
use crate::game::notify::{GameEvent, Notifier};
use crate::game::registry::{AppendQueue, Insert, Registry};
use crate::game::systems::{RechargeScheduler, Rechargeable, move_player, recharge_player};
use crate::game::types::{
    Direction, GameState, JoinResult, Location, LowResolutionCell, MoveResult,
};

pub struct Game {
    shared: Arc<Shared>,
    recharge: Mutex<Option<RechargeScheduler>>,
}

/// State reachable from both callers and the recharge task.
struct Shared {
    board: Board,
    target: Location,
    low_resolution: Vec<LowResolutionCell>,
    perseverance_visibility_radius: usize,
    ingenuity_visibility_radius: usize,
    max_players: usize,
    recharge_interval: Duration,
    battery_ceiling: AtomicU32,
    recharge_points: AtomicU32,
    // Join and move hold a read guard for their whole run; transitions take the write guard.
    lifecycle: RwLock<GameState>,
    play_options: Mutex<Option<GamePlayOptions>>,
    players: Registry<PlayerToken, Player>,
    token_cache: Registry<String, PlayerToken>,
    winners: AppendQueue<Player>,
    notifier: Notifier,
    rng: Mutex<StdRng>,
}

impl Game {
    /// Creates a game in the `Joining` state on the stock terrain for `options.map_number`.
    pub fn new(options: GameStartOptions) -> Result<Self> {
        let board = Board::new(options.width, options.height, options.map_number)?;
        let notifier = Notifier::new(options.notification_interval);
        Self::build(board, &options, notifier)
    }

    /// Creates a game on an already built board. `options.width`, `options.height` and
    /// `options.map_number` are ignored in favour of the board's own.
    pub fn with_board(board: Board, options: GameStartOptions) -> Result<Self> {
        let notifier = Notifier::new(options.notification_interval);
        Self::build(board, &options, notifier)
    }

    /// Creates a game that publishes its change notifications on `events`.
    pub fn with_events(options: GameStartOptions, events: broadcast::Sender<GameEvent>) -> Result<Self> {
        let board = Board::new(options.width, options.height, options.map_number)?;
        let notifier = Notifier::with_sender(events, options.notification_interval);
        Self::build(board, &options, notifier)
    }

    fn build(board: Board, options: &GameStartOptions, notifier: Notifier) -> Result<Self> {
        validate(options)?;

        let target = Location::new((board.width() / 2) as i32, (board.height() / 2) as i32);
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let low_resolution = low_resolution_map(&board, options.low_resolution_block_size);

        info!(
            "[Game] New game: {}x{} map={} target={} max_players={}",
            board.width(),
            board.height(),
            board.map_number(),
            target,
            options.max_players
        );

        Ok(Self {
            shared: Arc::new(Shared {
                board,
                target,
                low_resolution,
                perseverance_visibility_radius: options.perseverance_visibility_radius,
                ingenuity_visibility_radius: options.ingenuity_visibility_radius,
                max_players: options.max_players,
                recharge_interval: options.recharge_interval,
                battery_ceiling: AtomicU32::new(options.starting_battery_level),
                recharge_points: AtomicU32::new(0),
                lifecycle: RwLock::new(GameState::Joining),
                play_options: Mutex::new(None),
                players: Registry::new(),
                token_cache: Registry::new(),
                winners: AppendQueue::default(),
                notifier,
                rng: Mutex::new(rng),
            }),
            recharge: Mutex::new(None),
        })
    }

    /// Registers a new rover. Legal while joining or playing.
    pub fn join(&self, player_name: &str) -> Result<JoinResult> {
        let shared = &self.shared;
        let lifecycle = shared.lifecycle();
        let state = *lifecycle;
        if state != GameState::Joining && state != GameState::Playing {
            warn!("[Game] Join refused for {}: game is {}", player_name, state);
            return Err(GameError::InvalidGameState { current: state });
        }

        let occupied: HashSet<Location> = shared.players.values().iter().map(|p| p.location).collect();
        let battery_level = shared.battery_ceiling.load(Ordering::Acquire);
        let spawned = {
            let mut rng = shared.rng.lock().unwrap_or_else(PoisonError::into_inner);
            spawn_random_player(&shared.board, &occupied, shared.target, player_name, battery_level, &mut *rng)
        };
        let too_many = GameError::TooManyPlayers { max: shared.max_players };
        let Some(player) = spawned else {
            return Err(too_many);
        };

        match shared.players.try_insert_bounded(player.token, player.clone(), shared.max_players) {
            Insert::Inserted => {}
            Insert::Full => {
                warn!("[Game] Join refused for {}: {}", player_name, too_many);
                return Err(too_many);
            }
            Insert::AlreadyPresent => panic!("player token {} is already registered", player.token),
        }
        if !shared.token_cache.try_insert(player.token.to_string(), player.token) {
            panic!("token cache already holds {}", player.token);
        }
        drop(lifecycle);

        info!(
            "[Game] {} joined at {} facing {:?} (token={})",
            player.name, player.location, player.orientation, player.token
        );
        shared.raise_state_change();

        Ok(JoinResult {
            token: player.token,
            location: player.location,
            orientation: player.orientation,
            battery_level: player.battery_level,
            target_location: shared.target,
            neighbors: shared.board.get_neighbors(player.location, shared.perseverance_visibility_radius),
            low_resolution_map: shared.low_resolution.clone(),
        })
    }

    /// Moves from `Joining` to `Playing` and starts the recharge scheduler, which needs a
    /// tokio runtime on the calling thread.
    pub fn play_game(&self, options: GamePlayOptions) -> Result<()> {
        let shared = &self.shared;
        let mut lifecycle = shared.lifecycle.write().unwrap_or_else(PoisonError::into_inner);
        if *lifecycle != GameState::Joining {
            warn!("[Game] Cannot play game if currently {}", *lifecycle);
            return Err(GameError::InvalidGameState { current: *lifecycle });
        }
        if options.starting_battery_level == Some(0) {
            return Err(GameError::InvalidOptions("starting battery level must be positive"));
        }

        let scheduler = RechargeScheduler::start(Arc::downgrade(shared), shared.recharge_interval)?;

        if let Some(level) = options.starting_battery_level {
            shared.battery_ceiling.store(level, Ordering::Release);
            // Nobody can move while joining, so every rover still has its untouched starting charge.
            for player in shared.players.values() {
                let rebased = Player { battery_level: level, ..player.clone() };
                if !shared.players.compare_and_swap(&player.token, &player, rebased) {
                    warn!("[Game] Could not rebase battery for {}", player.token);
                }
            }
        }
        shared.recharge_points.store(options.recharge_points_per_tick, Ordering::Release);
        info!("[Game] Playing with {:?}", options);
        *shared.play_options.lock().unwrap_or_else(PoisonError::into_inner) = Some(options);
        *lifecycle = GameState::Playing;
        drop(lifecycle);

        *self.recharge.lock().unwrap_or_else(PoisonError::into_inner) = Some(scheduler);
        shared.raise_state_change();
        Ok(())
    }

    /// Moves from `Playing` to `GameOver` and stops recharging.
    pub fn end_game(&self) -> Result<()> {
        let shared = &self.shared;
        {
            let mut lifecycle = shared.lifecycle.write().unwrap_or_else(PoisonError::into_inner);
            if *lifecycle != GameState::Playing {
                return Err(GameError::InvalidGameState { current: *lifecycle });
            }
            *lifecycle = GameState::GameOver;
        }
        self.stop_recharge();
        info!("[Game] Game over, {} winners", shared.winners.len());
        shared.raise_state_change();
        Ok(())
    }

    /// Drives the rover owned by `token`. A lost race against another update of the same
    /// rover fails with [`GameError::UnableToUpdatePlayer`]; retry the whole call.
    pub fn move_perseverance(&self, token: PlayerToken, direction: Direction) -> Result<MoveResult> {
        let shared = &self.shared;
        let lifecycle = shared.lifecycle();
        if *lifecycle != GameState::Playing {
            return Err(GameError::InvalidGameState { current: *lifecycle });
        }
        let Some(current) = shared.players.get(&token) else {
            return Err(GameError::UnrecognizedToken(token));
        };

        let outcome = move_player(&current, direction, &shared.board, shared.target);
        let stored = if outcome.reached_target {
            shared.players.compare_and_remove(&token, &current)
        } else {
            shared.players.compare_and_swap(&token, &current, outcome.player.clone())
        };
        if !stored {
            warn!("[Game] Concurrent update lost for {} ({:?})", token, direction);
            return Err(GameError::UnableToUpdatePlayer(token));
        }
        if outcome.reached_target {
            shared.winners.push(outcome.player.clone());
            info!(
                "[Game] {} reached the target with {} battery left (place {})",
                outcome.player.name,
                outcome.player.battery_level,
                shared.winners.len()
            );
        }
        drop(lifecycle);

        debug!("[Game] {} {:?}: {}", token, direction, outcome.message);
        shared.raise_state_change();

        let player = outcome.player;
        Ok(MoveResult {
            location: player.location,
            battery_level: player.battery_level,
            orientation: player.orientation,
            neighbors: shared.board.get_neighbors(player.location, shared.perseverance_visibility_radius),
            message: outcome.message,
        })
    }

    /// Runs one recharge step immediately. Returns how many rovers gained charge.
    pub fn recharge_tick(&self) -> usize {
        self.shared.recharge_tick()
    }

    pub fn get_player_location(&self, token: PlayerToken) -> Result<Location> {
        self.shared
            .players
            .get(&token)
            .map(|player| player.location)
            .ok_or(GameError::UnrecognizedToken(token))
    }

    /// Resolves a token string issued by this game. Never mutates.
    pub fn try_translate_token(&self, token: &str) -> Option<PlayerToken> {
        self.shared.token_cache.get(&token.to_string())
    }

    /// Active rovers, in no particular order.
    pub fn players(&self) -> Vec<Player> {
        self.shared.players.values()
    }

    /// Rovers that reached the target, in arrival order.
    pub fn winners(&self) -> Vec<Player> {
        self.shared.winners.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.shared.notifier.subscribe()
    }

    pub fn state(&self) -> GameState {
        *self.shared.lifecycle()
    }

    pub fn board(&self) -> &Board {
        &self.shared.board
    }

    pub fn map_number(&self) -> u32 {
        self.shared.board.map_number()
    }

    pub fn target_location(&self) -> Location {
        self.shared.target
    }

    pub fn low_resolution_map(&self) -> &[LowResolutionCell] {
        &self.shared.low_resolution
    }

    pub fn starting_battery_level(&self) -> u32 {
        self.shared.battery_ceiling.load(Ordering::Acquire)
    }

    pub fn max_players(&self) -> usize {
        self.shared.max_players
    }

    pub fn perseverance_visibility_radius(&self) -> usize {
        self.shared.perseverance_visibility_radius
    }

    pub fn ingenuity_visibility_radius(&self) -> usize {
        self.shared.ingenuity_visibility_radius
    }

    pub fn play_options(&self) -> Option<GamePlayOptions> {
        self.shared.play_options.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_recharging(&self) -> bool {
        self.recharge
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(RechargeScheduler::is_running)
    }

    /// Stops the recharge task and silences notifications. Safe to call more than once,
    /// and before the game was ever played.
    pub fn dispose(&self) {
        self.stop_recharge();
        self.shared.notifier.detach();
    }

    fn stop_recharge(&self) {
        if let Some(scheduler) = self.recharge.lock().unwrap_or_else(PoisonError::into_inner).take() {
            scheduler.stop();
            debug!("[Game] Recharge stopped");
        }
    }

    #[cfg(test)]
    pub(crate) fn insert_player(&self, player: Player) {
        assert!(self.shared.players.try_insert(player.token, player.clone()));
        assert!(self.shared.token_cache.try_insert(player.token.to_string(), player.token));
    }

    #[cfg(test)]
    pub(crate) fn replace_player(&self, player: Player) {
        let token = player.token;
        let current = self.shared.players.get(&token).unwrap();
        assert!(self.shared.players.compare_and_swap(&token, &current, player));
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        self.stop_recharge();
    }
}

impl Shared {
    fn lifecycle(&self) -> RwLockReadGuard<'_, GameState> {
        self.lifecycle.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn raise_state_change(&self) {
        let state = *self.lifecycle();
        self.notifier.notify(GameEvent::StateChanged { state });
    }
}

impl Rechargeable for Shared {
    fn recharge_tick(&self) -> usize {
        let ceiling = self.battery_ceiling.load(Ordering::Acquire);
        let points = self.recharge_points.load(Ordering::Acquire);
        let mut recharged = 0;

        for token in self.players.keys() {
            // The rover may have won since the keys were listed.
            let Some(player) = self.players.get(&token) else { continue };
            let Some(charged) = recharge_player(&player, ceiling, points) else { continue };
            if self.players.compare_and_swap(&token, &player, charged) {
                recharged += 1;
            } else {
                debug!("[Recharge] Skipped {}: updated concurrently", token);
            }
        }

        self.raise_state_change();
        recharged
    }
}

fn validate(options: &GameStartOptions) -> Result<()> {
    if options.starting_battery_level == 0 {
        return Err(GameError::InvalidOptions("starting battery level must be positive"));
    }
    if options.max_players == 0 {
        return Err(GameError::InvalidOptions("max players must be positive"));
    }
    if options.low_resolution_block_size == 0 {
        return Err(GameError::InvalidOptions("low resolution block size must be positive"));
    }
    if options.recharge_interval.is_zero() {
        return Err(GameError::InvalidOptions("recharge interval must be positive"));
    }
    Ok(())
}
