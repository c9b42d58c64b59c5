//! BoardContext - access to storage, column locks and the change notifier
//!
//! The context provides data access primitives and lock acquisition. No
//! business logic lives here; commands do all the work.

use crate::error::{BoardError, Result};
use crate::lock::{ColumnGuard, ColumnLocks};
use crate::notify::ChangeNotifier;
use crate::order::{sort_column, Reconciliation};
use crate::store::{FileTaskStore, MemoryTaskStore, TaskStore};
use crate::types::{ColumnId, ColumnKey, Task, TaskId, Uid};
use std::path::PathBuf;
use std::sync::Arc;

/// Give up re-locking a task that keeps changing columns after this many tries
const MAX_LOCK_ATTEMPTS: usize = 8;

/// Context passed to every command - provides access, not logic
pub struct BoardContext {
    store: Arc<dyn TaskStore>,
    locks: ColumnLocks,
    notifier: ChangeNotifier,
}

impl BoardContext {
    /// Create a context over an existing store and notifier
    pub fn new(store: Arc<dyn TaskStore>, notifier: ChangeNotifier) -> Self {
        Self {
            store,
            locks: ColumnLocks::new(),
            notifier,
        }
    }

    /// Context backed by an in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTaskStore::new()), ChangeNotifier::default())
    }

    /// Context backed by a file store rooted at `root`
    pub async fn open(root: impl Into<PathBuf>, notifier: ChangeNotifier) -> Result<Self> {
        let store = FileTaskStore::open(root).await?;
        Ok(Self::new(Arc::new(store), notifier))
    }

    pub fn store(&self) -> &dyn TaskStore {
        self.store.as_ref()
    }

    pub fn locks(&self) -> &ColumnLocks {
        &self.locks
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Read a task, failing when it does not exist
    pub async fn read_task(&self, id: &TaskId) -> Result<Task> {
        self.store
            .get_task(id)
            .await?
            .ok_or_else(|| BoardError::TaskNotFound { id: id.to_string() })
    }

    /// Read a task and verify `uid` owns it
    pub async fn read_owned_task(&self, id: &TaskId, uid: &Uid) -> Result<Task> {
        let task = self.read_task(id).await?;
        if !task.is_owned_by(uid) {
            tracing::warn!(task = %id, requester = %uid, "rejected mutation by non-owner");
            return Err(BoardError::Unauthorized { id: id.to_string() });
        }
        Ok(task)
    }

    /// Read a column in display order
    pub async fn read_column(&self, key: &ColumnKey) -> Result<Vec<Task>> {
        let mut tasks = self.store.tasks_in_column(key).await?;
        sort_column(&mut tasks);
        Ok(tasks)
    }

    // =========================================================================
    // Locking
    // =========================================================================

    /// Lock a column partition
    pub async fn lock_column(&self, key: &ColumnKey) -> ColumnGuard {
        self.locks.lock(key).await
    }

    /// Lock the column an owned task sits in, plus `destination` if given.
    ///
    /// The task is re-read under the lock. If a concurrent move changed its
    /// column in the meantime the locks are released and taken again for
    /// the new column.
    pub async fn lock_owned_task(
        &self,
        id: &TaskId,
        uid: &Uid,
        destination: Option<&ColumnId>,
    ) -> Result<(Task, ColumnGuard)> {
        for attempt in 0..MAX_LOCK_ATTEMPTS {
            let task = self.read_owned_task(id, uid).await?;
            let mut keys = vec![task.column_key()];
            if let Some(status) = destination {
                keys.push(ColumnKey::new(uid.clone(), status.clone()));
            }

            let guard = self.locks.lock_all(keys).await;
            let current = self.read_task(id).await?;
            if guard.covers(&current.column_key()) {
                return Ok((current, guard));
            }
            tracing::debug!(task = %id, attempt, "task changed column while locking, retrying");
        }
        Err(BoardError::LockContention { id: id.to_string() })
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Write every placement of a reconciliation.
    ///
    /// `before` is the snapshot the plan was computed from. If a write fails,
    /// the tasks already repositioned are put back from it, so the columns
    /// are left as they were. Caller must hold the locks for all affected
    /// columns.
    pub async fn apply(&self, reconciliation: &Reconciliation, before: &[Task]) -> Result<()> {
        let mut written: Vec<&TaskId> = Vec::new();
        for change in reconciliation.iter() {
            let placed = self
                .store
                .set_position(&change.id, &change.status, change.rank)
                .await;
            if let Err(e) = placed {
                tracing::warn!(
                    task = %change.id,
                    error = %e,
                    rolled_back = written.len(),
                    "placement failed, restoring column"
                );
                let rollback: Vec<&Task> = before
                    .iter()
                    .filter(|t| written.contains(&&t.id))
                    .collect();
                self.restore(rollback).await;
                return Err(e);
            }
            written.push(&change.id);
        }
        Ok(())
    }

    /// Write whole records back from a snapshot. Failures are only logged.
    pub async fn restore<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>) {
        for task in tasks {
            if let Err(e) = self.store.update_task(task).await {
                tracing::error!(task = %task.id, error = %e, "failed to restore task");
            }
        }
    }
}
