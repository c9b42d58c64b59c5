//! Task record storage.
//!
//! The store is the single source of truth. It serializes writes per record
//! but knows nothing about ranks; keeping columns contiguous is the job of
//! the reconciler running under a column lock.

#[cfg(test)]
mod failing;
mod file;
mod memory;

#[cfg(test)]
pub(crate) use failing::FailingPlacementStore;
pub use file::FileTaskStore;
pub use memory::MemoryTaskStore;

use crate::error::Result;
use crate::types::{ColumnId, ColumnKey, Task, TaskId, Uid, User};
use async_trait::async_trait;
use taskboard_operations::LogEntry;

/// Durable keyed storage for tasks and users
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new task
    async fn insert_task(&self, task: &Task) -> Result<()>;

    /// Point lookup
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>>;

    /// Replace a stored task; fails with `TaskNotFound` when absent
    async fn update_task(&self, task: &Task) -> Result<()>;

    /// Move a task to a new status/rank; fails with `TaskNotFound` when absent
    async fn set_position(&self, id: &TaskId, status: &ColumnId, rank: u32) -> Result<()>;

    /// Remove a task; returns whether it existed
    async fn delete_task(&self, id: &TaskId) -> Result<bool>;

    /// All tasks belonging to `uid`, in no particular order
    async fn tasks_for_owner(&self, uid: &Uid) -> Result<Vec<Task>>;

    /// Tasks of one column partition, in no particular order
    async fn tasks_in_column(&self, key: &ColumnKey) -> Result<Vec<Task>> {
        let mut tasks = self.tasks_for_owner(&key.uid).await?;
        tasks.retain(|t| t.status == key.status);
        Ok(tasks)
    }

    /// Insert a user unless one with the same uid exists; returns the stored record
    async fn insert_user_if_absent(&self, user: &User) -> Result<User>;

    /// Look up a user
    async fn get_user(&self, uid: &Uid) -> Result<Option<User>>;

    /// Append an audit entry
    async fn append_activity(&self, entry: &LogEntry) -> Result<()>;

    /// Audit entries, newest first
    async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>>;
}
