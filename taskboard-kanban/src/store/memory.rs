//! In-process store, used for ephemeral boards and tests

use super::TaskStore;
use crate::error::{BoardError, Result};
use crate::types::{ColumnId, Task, TaskId, Uid, User};
use async_trait::async_trait;
use std::collections::HashMap;
use taskboard_operations::LogEntry;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
    users: RwLock<HashMap<Uid, User>>,
    activity: RwLock<Vec<LogEntry>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert_task(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(BoardError::store(format!("task {} already exists", task.id)));
        }
        tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn update_task(&self, task: &Task) -> Result<()> {
        match self.tasks.write().await.get_mut(&task.id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(())
            }
            None => Err(BoardError::TaskNotFound {
                id: task.id.to_string(),
            }),
        }
    }

    async fn set_position(&self, id: &TaskId, status: &ColumnId, rank: u32) -> Result<()> {
        match self.tasks.write().await.get_mut(id) {
            Some(stored) => {
                stored.status = status.clone();
                stored.rank = rank;
                Ok(())
            }
            None => Err(BoardError::TaskNotFound { id: id.to_string() }),
        }
    }

    async fn delete_task(&self, id: &TaskId) -> Result<bool> {
        Ok(self.tasks.write().await.remove(id).is_some())
    }

    async fn tasks_for_owner(&self, uid: &Uid) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| &t.uid == uid)
            .cloned()
            .collect())
    }

    async fn insert_user_if_absent(&self, user: &User) -> Result<User> {
        let mut users = self.users.write().await;
        Ok(users
            .entry(user.uid.clone())
            .or_insert_with(|| user.clone())
            .clone())
    }

    async fn get_user(&self, uid: &Uid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(uid).cloned())
    }

    async fn append_activity(&self, entry: &LogEntry) -> Result<()> {
        self.activity.write().await.push(entry.clone());
        Ok(())
    }

    async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        let activity = self.activity.read().await;
        let newest_first = activity.iter().rev().cloned();
        Ok(match limit {
            Some(limit) => newest_first.take(limit).collect(),
            None => newest_first.collect(),
        })
    }
}
