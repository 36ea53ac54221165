//! Throttled change notifications.
//!
//! Observers subscribe to a broadcast channel and must still poll for state: at most one
//! event goes out per interval no matter how many changes happen in between.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::broadcast;

use crate::config::game::EVENT_CHANNEL_CAPACITY;
use crate::game::types::GameState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    StateChanged { state: GameState },
    NewGameStarted { map_number: u32 },
}

#[derive(Debug)]
pub struct Notifier {
    sender: broadcast::Sender<GameEvent>,
    interval: Duration,
    last_notified: Mutex<Option<Instant>>,
    detached: AtomicBool,
}

impl Notifier {
    /// Notifier with its own channel.
    pub fn new(interval: Duration) -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self::with_sender(sender, interval)
    }

    /// Notifier publishing on an existing channel, e.g. one owned by a session manager.
    pub fn with_sender(sender: broadcast::Sender<GameEvent>, interval: Duration) -> Self {
        Self {
            sender,
            interval,
            last_notified: Mutex::new(None),
            detached: AtomicBool::new(false),
        }
    }

    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.sender.subscribe()
    }

    /// Sends `event` unless one was sent less than `interval` ago. Returns whether it went out.
    pub fn notify(&self, event: GameEvent) -> bool {
        if self.detached.load(Ordering::Acquire) {
            return false;
        }
        {
            let mut last = self.last_notified.lock().unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            if last.is_some_and(|at| now.duration_since(at) < self.interval) {
                return false;
            }
            *last = Some(now);
        }
        // No subscribers is not an error.
        let _ = self.sender.send(event);
        true
    }

    /// Stops all further notifications. Existing subscribers see no more events from here.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed() -> GameEvent {
        GameEvent::StateChanged { state: GameState::Playing }
    }

    #[test]
    fn zero_interval_lets_everything_through() {
        let notifier = Notifier::new(Duration::ZERO);
        let mut events = notifier.subscribe();
        assert!(notifier.notify(changed()));
        assert!(notifier.notify(changed()));
        assert_eq!(events.try_recv().unwrap(), changed());
        assert_eq!(events.try_recv().unwrap(), changed());
    }

    #[test]
    fn bursts_are_throttled() {
        let notifier = Notifier::new(Duration::from_secs(60));
        let mut events = notifier.subscribe();
        let sent = (0..100).filter(|_| notifier.notify(changed())).count();
        assert_eq!(sent, 1);
        assert!(events.try_recv().is_ok());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn detached_notifier_is_silent() {
        let notifier = Notifier::new(Duration::ZERO);
        let mut events = notifier.subscribe();
        notifier.detach();
        assert!(!notifier.notify(changed()));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn notifying_without_subscribers_is_fine() {
        let notifier = Notifier::new(Duration::ZERO);
        assert!(notifier.notify(changed()));
    }
}
