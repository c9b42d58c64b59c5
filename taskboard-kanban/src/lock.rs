//! Per-column mutual exclusion.
//!
//! Reconciliation reads a column, computes new ranks and writes them back one
//! task at a time. Holding the column's lock across that sequence keeps two
//! requests from interleaving their writes. Columns of different owners or
//! statuses never contend.

use crate::types::ColumnKey;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Purge dead entries every this many acquisitions
const CLEANUP_INTERVAL: usize = 64;

/// ...but only once the map holds at least this many entries
const CLEANUP_THRESHOLD: usize = 128;

/// Lock table keyed by (owner, status).
///
/// Entries are weak so a column nobody is reconciling costs nothing once
/// its guards are gone.
#[derive(Default)]
pub struct ColumnLocks {
    locks: StdMutex<HashMap<ColumnKey, Weak<Mutex<()>>>>,
    acquisitions: AtomicUsize,
}

impl ColumnLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn mutex_for(&self, key: &ColumnKey) -> Arc<Mutex<()>> {
        let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

        let mutex = map.get(key).and_then(Weak::upgrade).unwrap_or_else(|| {
            let fresh = Arc::new(Mutex::new(()));
            map.insert(key.clone(), Arc::downgrade(&fresh));
            fresh
        });

        let tick = self.acquisitions.fetch_add(1, Ordering::Relaxed);
        if map.len() > CLEANUP_THRESHOLD && tick % CLEANUP_INTERVAL == 0 {
            map.retain(|_, weak| weak.strong_count() > 0);
        }

        mutex
    }

    /// Lock a single column
    pub async fn lock(&self, key: &ColumnKey) -> ColumnGuard {
        self.lock_all([key.clone()]).await
    }

    /// Lock several columns at once.
    ///
    /// Keys are taken in sorted order with duplicates collapsed, so two
    /// cross-column moves in opposite directions cannot deadlock.
    pub async fn lock_all(&self, keys: impl IntoIterator<Item = ColumnKey>) -> ColumnGuard {
        let mut keys: Vec<ColumnKey> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            let mutex = self.mutex_for(key);
            guards.push(mutex.lock_owned().await);
        }
        tracing::trace!(columns = ?keys, "column locks acquired");

        ColumnGuard {
            keys,
            _guards: guards,
        }
    }

    /// Number of entries currently in the table
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries whose guards have all been released
    pub fn purge(&self) {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, weak| weak.strong_count() > 0);
    }
}

/// RAII guard over one or more column locks - releases on drop
pub struct ColumnGuard {
    keys: Vec<ColumnKey>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl ColumnGuard {
    /// Whether this guard covers `key`
    pub fn covers(&self, key: &ColumnKey) -> bool {
        self.keys.binary_search(key).is_ok()
    }
}
