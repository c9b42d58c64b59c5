//! Task record

use super::ids::{ColumnId, ColumnKey, TaskId, Uid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task/card on an owner's board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Owner; immutable after creation
    pub uid: Uid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Column the task sits in
    pub status: ColumnId,
    /// Position within the (uid, status) column, contiguous from 0
    pub rank: u32,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task at rank 0 of the given column
    pub fn new(uid: impl Into<Uid>, title: impl Into<String>, status: impl Into<ColumnId>) -> Self {
        Self {
            id: TaskId::new(),
            uid: uid.into(),
            title: title.into(),
            description: String::new(),
            status: status.into(),
            rank: 0,
            created_at: Utc::now(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the rank
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = rank;
        self
    }

    /// The column partition this task belongs to
    pub fn column_key(&self) -> ColumnKey {
        ColumnKey::new(self.uid.clone(), self.status.clone())
    }

    /// Whether `uid` is this task's owner
    pub fn is_owned_by(&self, uid: &Uid) -> bool {
        &self.uid == uid
    }
}
