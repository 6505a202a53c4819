//! Per-identifier mutual exclusion for reconciliation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// A map of async mutexes keyed by string. Entries exist only while someone
/// holds or waits on them.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    slots: Slots,
}

/// Held for the duration of one critical section on a key.
pub struct KeyedGuard {
    // Dropped in order: the mutex is released before the slot sweep runs.
    _guard: OwnedMutexGuard<()>,
    _release: SlotRelease,
}

/// Removes slots nobody holds or waits on. Runs when a guard is released and
/// when a `lock` call is abandoned before acquiring.
struct SlotRelease {
    slots: Slots,
}

impl Drop for SlotRelease {
    fn drop(&mut self) {
        self.slots
            .lock()
            .retain(|_, slot| Arc::strong_count(slot) > 1);
    }
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task holds `key`, then takes it.
    pub async fn lock(&self, key: &str) -> KeyedGuard {
        let slot = {
            let mut slots = self.slots.lock();
            slots.entry(key.to_string()).or_default().clone()
        };
        let release = SlotRelease {
            slots: self.slots.clone(),
        };
        let guard = slot.lock_owned().await;
        KeyedGuard {
            _guard: guard,
            _release: release,
        }
    }

    /// Number of keys currently held or awaited.
    #[cfg(test)]
    pub fn active(&self) -> usize {
        self.slots.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_serialized() {
        let locks = KeyedLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = inside.clone();
            let max_inside = max_inside.clone();
            tasks.push(tokio::spawn(async move {
                let _guard = locks.lock("u1").await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(
            max_inside.load(Ordering::SeqCst),
            1,
            "two holders of the same key overlapped"
        );
        assert_eq!(locks.active(), 0, "slot should be removed once released");
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.lock("a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock("b")).await;
        assert!(b.is_ok(), "lock on another key should not wait");
        assert_eq!(locks.active(), 2);
    }

    #[tokio::test]
    async fn test_waiter_keeps_slot_alive() {
        let locks = KeyedLocks::new();
        let first = locks.lock("k").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock("k").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(first);
        assert!(locks.active() <= 1);

        waiter.await.unwrap();
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_waiter_releases_slot() {
        let locks = KeyedLocks::new();
        let holder = locks.lock("k").await;

        let mut waiter = Box::pin(locks.lock("k"));
        let attempt = tokio::time::timeout(Duration::from_millis(10), &mut waiter).await;
        assert!(attempt.is_err(), "waiter should still be blocked");

        drop(holder);
        assert_eq!(locks.active(), 1, "pending waiter keeps the slot");

        drop(waiter);
        assert_eq!(locks.active(), 0, "abandoned waiter must not leave its slot behind");
    }

    #[tokio::test]
    async fn test_release_keeps_other_held_keys() {
        let locks = KeyedLocks::new();
        let a = locks.lock("a").await;
        let b = locks.lock("b").await;
        drop(a);
        assert_eq!(locks.active(), 1);
        drop(b);
        assert_eq!(locks.active(), 0);
    }
}
