//! Per-key async mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// One async mutex per key, created on first use and dropped again once
/// nobody holds or waits for it.
///
/// Holders of different keys never contend. The guard is owned, so it can
/// be held across `.await` points for a whole read-modify-write.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Arc<LockMap>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> KeyedGuard {
        // Clone the Arc out so the map shard is released before awaiting.
        let lock = Arc::clone(
            self.locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        KeyedGuard {
            locks: Arc::clone(&self.locks),
            key: key.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one key. Dropping it releases the key and evicts
/// the key's mutex when no other task holds a handle to it.
#[derive(Debug)]
pub struct KeyedGuard {
    locks: Arc<LockMap>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyedGuard {
    fn drop(&mut self) {
        // Release first so our own handle no longer counts.
        drop(self.guard.take());
        // `remove_if` holds the shard lock, so a concurrent `lock` either
        // cloned the Arc already (count > 1) or inserts a fresh mutex after.
        self.locks.remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
