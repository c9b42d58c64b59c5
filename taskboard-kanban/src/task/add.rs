//! AddTask command

use crate::audit::logged;
use crate::context::BoardContext;
use crate::error::{BoardError, Result};
use crate::order::append_rank;
use crate::types::{ColumnId, ColumnKey, Task, Uid};
use crate::validate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use taskboard_operations::{async_trait, Execute, ExecutionResult, Operation};

/// Create a task at the end of its column
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddTask {
    /// Owner of the new task
    pub uid: Uid,
    /// The task title (required)
    pub title: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Column to create the task in; defaults to "todo"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ColumnId>,
}

impl AddTask {
    /// Create a new AddTask command
    pub fn new(uid: impl Into<Uid>, title: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            description: None,
            status: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the column
    pub fn with_status(mut self, status: impl Into<ColumnId>) -> Self {
        self.status = Some(status.into());
        self
    }

    fn validate(&self) -> Result<()> {
        validate::uid(&self.uid)?;
        validate::title(&self.title)?;
        if let Some(description) = &self.description {
            validate::description(description)?;
        }
        if let Some(status) = &self.status {
            validate::status(status)?;
        }
        Ok(())
    }

    async fn run(&self, ctx: &BoardContext) -> Result<Value> {
        self.validate()?;

        let status = self.status.clone().unwrap_or_else(ColumnId::todo);
        let key = ColumnKey::new(self.uid.clone(), status.clone());

        let _guard = ctx.lock_column(&key).await;
        let column = ctx.read_column(&key).await?;

        let task = Task::new(self.uid.clone(), self.title.clone(), status)
            .with_description(self.description.clone().unwrap_or_default())
            .with_rank(append_rank(&column)?);
        ctx.store().insert_task(&task).await?;

        tracing::info!(task = %task.id, column = %key, rank = task.rank, "task created");
        Ok(serde_json::to_value(&task)?)
    }
}

impl Operation for AddTask {
    fn verb(&self) -> &'static str {
        "add"
    }

    fn noun(&self) -> &'static str {
        "task"
    }

    fn actor(&self) -> Option<&str> {
        Some(self.uid.as_str())
    }
}

#[async_trait]
impl Execute<BoardContext, BoardError> for AddTask {
    async fn execute(&self, ctx: &BoardContext) -> ExecutionResult<Value, BoardError> {
        let started = Instant::now();
        logged(self, started, self.run(ctx).await)
    }
}
