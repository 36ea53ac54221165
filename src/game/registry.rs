//! Concurrent keyed storage for player snapshots.
//!
//! Every operation is atomic per call: callers never hold a lock across operations, so
//! a read-modify-write is expressed as `get` followed by `compare_and_swap`, and the
//! loser of a race finds out from the return value.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Result of a bounded insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insert {
    Inserted,
    AlreadyPresent,
    Full,
}

#[derive(Debug)]
pub struct Registry<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + PartialEq,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, V>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, V>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts only if `key` is absent.
    pub fn try_insert(&self, key: K, value: V) -> bool {
        self.try_insert_bounded(key, value, usize::MAX) == Insert::Inserted
    }

    /// Inserts only if `key` is absent and fewer than `max` entries exist. Both checks
    /// and the insert happen under one lock, so concurrent callers cannot overshoot `max`.
    pub fn try_insert_bounded(&self, key: K, value: V, max: usize) -> Insert {
        let mut entries = self.write();
        if entries.contains_key(&key) {
            return Insert::AlreadyPresent;
        }
        if entries.len() >= max {
            return Insert::Full;
        }
        entries.insert(key, value);
        Insert::Inserted
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.read().contains_key(key)
    }

    /// Replaces the value for `key` with `new` only if it still equals `expected`.
    pub fn compare_and_swap(&self, key: &K, expected: &V, new: V) -> bool {
        let mut entries = self.write();
        match entries.get_mut(key) {
            Some(current) if current == expected => {
                *current = new;
                true
            }
            _ => false,
        }
    }

    /// Removes `key` only if its value still equals `expected`.
    pub fn compare_and_remove(&self, key: &K, expected: &V) -> bool {
        let mut entries = self.write();
        if entries.get(key) == Some(expected) {
            entries.remove(key);
            true
        } else {
            false
        }
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.write().remove(key)
    }

    pub fn keys(&self) -> Vec<K> {
        self.read().keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<V> {
        self.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

/// Append-only FIFO. Reads return a snapshot in insertion order.
#[derive(Debug)]
pub struct AppendQueue<T> {
    items: Mutex<Vec<T>>,
}

impl<T> Default for AppendQueue<T> {
    fn default() -> Self {
        Self { items: Mutex::new(Vec::new()) }
    }
}

impl<T: Clone> AppendQueue<T> {
    pub fn push(&self, item: T) {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).push(item);
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn insert_refuses_existing_key() {
        let registry = Registry::new();
        assert!(registry.try_insert("a", 1));
        assert!(!registry.try_insert("a", 2));
        assert_eq!(registry.get(&"a"), Some(1));
    }

    #[test]
    fn bounded_insert_reports_full() {
        let registry = Registry::new();
        assert_eq!(registry.try_insert_bounded(1, "x", 2), Insert::Inserted);
        assert_eq!(registry.try_insert_bounded(2, "y", 2), Insert::Inserted);
        assert_eq!(registry.try_insert_bounded(3, "z", 2), Insert::Full);
        assert_eq!(registry.try_insert_bounded(1, "z", 2), Insert::AlreadyPresent);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn compare_and_swap_needs_matching_snapshot() {
        let registry = Registry::new();
        registry.try_insert("a", 10);
        assert!(!registry.compare_and_swap(&"a", &9, 11));
        assert!(registry.compare_and_swap(&"a", &10, 11));
        assert_eq!(registry.get(&"a"), Some(11));
        assert!(!registry.compare_and_swap(&"missing", &0, 1));
    }

    #[test]
    fn compare_and_remove_needs_matching_snapshot() {
        let registry = Registry::new();
        registry.try_insert("a", 10);
        assert!(!registry.compare_and_remove(&"a", &9));
        assert!(registry.compare_and_remove(&"a", &10));
        assert!(registry.is_empty());
    }

    #[test]
    fn only_one_racer_wins_a_swap() {
        let registry = Arc::new(Registry::new());
        registry.try_insert(0u8, 0u32);

        let handles: Vec<_> = (1..=8u32)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.compare_and_swap(&0, &0, i))
            })
            .collect();
        let wins = handles.into_iter().map(|h| h.join().unwrap()).filter(|won| *won).count();
        assert_eq!(wins, 1);
        assert_ne!(registry.get(&0), Some(0));
    }

    #[test]
    fn bounded_insert_never_overshoots_under_contention() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..32u32)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.try_insert_bounded(i, i, 5))
            })
            .collect();
        let inserted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|outcome| *outcome == Insert::Inserted)
            .count();
        assert_eq!(inserted, 5);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn queue_keeps_insertion_order() {
        let queue = AppendQueue::default();
        queue.push("first");
        queue.push("second");
        assert_eq!(queue.snapshot(), vec!["first", "second"]);
        assert_eq!(queue.len(), 2);
    }
}
