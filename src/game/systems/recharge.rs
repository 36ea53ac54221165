//! Battery recharge system.
//!
//! A periodic task tops up every rover's battery. The task only holds a weak reference to
//! what it recharges and is aborted when its [`RechargeScheduler`] is stopped or dropped.

use std::sync::Weak;
use std::time::Duration;

use log::debug;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::game::entities::Player;
use crate::game::error::{GameError, Result};

/// Something with a battery-recharge step to run on every tick.
pub trait Rechargeable: Send + Sync + 'static {
    fn recharge_tick(&self) -> usize;
}

/// Recharged copy of `player`, or `None` if it is already at `max`.
pub fn recharge_player(player: &Player, max: u32, points: u32) -> Option<Player> {
    if player.battery_level >= max {
        return None;
    }
    Some(Player {
        battery_level: player.battery_level.saturating_add(points).min(max),
        ..player.clone()
    })
}

#[derive(Debug)]
pub struct RechargeScheduler {
    handle: JoinHandle<()>,
}

impl RechargeScheduler {
    /// Spawns the tick loop on the current tokio runtime. The first tick fires one
    /// `period` after start.
    pub fn start<T: Rechargeable>(target: Weak<T>, period: Duration) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| GameError::RuntimeUnavailable)?;
        let handle = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(target) = target.upgrade() else {
                    debug!("[Recharge] Target dropped, stopping.");
                    break;
                };
                let recharged = target.recharge_tick();
                debug!("[Recharge] Tick recharged {} players", recharged);
            }
        });
        Ok(Self { handle })
    }

    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for RechargeScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
