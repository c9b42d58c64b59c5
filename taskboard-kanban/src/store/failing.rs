//! Test store whose placement writes start failing after a budget runs out

use super::{MemoryTaskStore, TaskStore};
use crate::error::{BoardError, Result};
use crate::types::{ColumnId, Task, TaskId, Uid, User};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use taskboard_operations::LogEntry;

/// Delegates to a [`MemoryTaskStore`], except that only the first
/// `allowed` calls to `set_position` succeed
pub(crate) struct FailingPlacementStore {
    inner: MemoryTaskStore,
    allowed: AtomicUsize,
}

impl FailingPlacementStore {
    pub(crate) fn new(allowed: usize) -> Self {
        Self {
            inner: MemoryTaskStore::new(),
            allowed: AtomicUsize::new(allowed),
        }
    }
}

#[async_trait]
impl TaskStore for FailingPlacementStore {
    async fn insert_task(&self, task: &Task) -> Result<()> {
        self.inner.insert_task(task).await
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        self.inner.get_task(id).await
    }

    async fn update_task(&self, task: &Task) -> Result<()> {
        self.inner.update_task(task).await
    }

    async fn set_position(&self, id: &TaskId, status: &ColumnId, rank: u32) -> Result<()> {
        let budget = self
            .allowed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if budget.is_err() {
            return Err(BoardError::store("disk gone"));
        }
        self.inner.set_position(id, status, rank).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<bool> {
        self.inner.delete_task(id).await
    }

    async fn tasks_for_owner(&self, uid: &Uid) -> Result<Vec<Task>> {
        self.inner.tasks_for_owner(uid).await
    }

    async fn insert_user_if_absent(&self, user: &User) -> Result<User> {
        self.inner.insert_user_if_absent(user).await
    }

    async fn get_user(&self, uid: &Uid) -> Result<Option<User>> {
        self.inner.get_user(uid).await
    }

    async fn append_activity(&self, entry: &LogEntry) -> Result<()> {
        self.inner.append_activity(entry).await
    }

    async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        self.inner.read_activity(limit).await
    }
}
