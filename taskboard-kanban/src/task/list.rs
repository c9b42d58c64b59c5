//! ListTasks command

use crate::audit::unlogged;
use crate::context::BoardContext;
use crate::error::{BoardError, Result};
use crate::types::{ColumnId, Task, Uid};
use crate::validate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskboard_operations::{async_trait, Execute, ExecutionResult, Operation};

/// List an owner's tasks, grouped by column and in rank order
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListTasks {
    pub uid: Uid,
    /// Restrict to a single column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ColumnId>,
}

impl ListTasks {
    pub fn new(uid: impl Into<Uid>) -> Self {
        Self {
            uid: uid.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<ColumnId>) -> Self {
        self.status = Some(status.into());
        self
    }

    async fn run(&self, ctx: &BoardContext) -> Result<Value> {
        validate::uid(&self.uid)?;

        let mut tasks: Vec<Task> = ctx.store().tasks_for_owner(&self.uid).await?;
        if let Some(status) = &self.status {
            tasks.retain(|t| &t.status == status);
        }
        tasks.sort_by(|a, b| {
            a.status
                .cmp(&b.status)
                .then_with(|| a.rank.cmp(&b.rank))
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(serde_json::to_value(&tasks)?)
    }
}

impl Operation for ListTasks {
    fn verb(&self) -> &'static str {
        "list"
    }

    fn noun(&self) -> &'static str {
        "tasks"
    }

    fn actor(&self) -> Option<&str> {
        Some(self.uid.as_str())
    }
}

#[async_trait]
impl Execute<BoardContext, BoardError> for ListTasks {
    async fn execute(&self, ctx: &BoardContext) -> ExecutionResult<Value, BoardError> {
        unlogged(self.run(ctx).await)
    }

    fn affected_resource_ids(&self, _result: &Value) -> Vec<String> {
        Vec::new()
    }
}
