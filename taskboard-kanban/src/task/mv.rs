//! MoveTask command

use crate::audit::logged;
use crate::context::BoardContext;
use crate::error::{BoardError, Result};
use crate::order::plan_move;
use crate::types::{ColumnId, ColumnKey, TaskId, Uid};
use crate::validate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use taskboard_operations::{async_trait, Execute, ExecutionResult, Operation};

/// Move a task to a position in the same or another column
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoveTask {
    /// The task ID to move
    pub id: TaskId,
    /// Requester; must own the task
    pub uid: Uid,
    /// Destination column
    pub status: ColumnId,
    /// 0-indexed position among the destination's other tasks
    pub order: usize,
}

impl MoveTask {
    pub fn new(
        id: impl Into<TaskId>,
        uid: impl Into<Uid>,
        status: impl Into<ColumnId>,
        order: usize,
    ) -> Self {
        Self {
            id: id.into(),
            uid: uid.into(),
            status: status.into(),
            order,
        }
    }

    async fn run(&self, ctx: &BoardContext) -> Result<Value> {
        validate::uid(&self.uid)?;
        validate::status(&self.status)?;

        let (task, _guard) = ctx
            .lock_owned_task(&self.id, &self.uid, Some(&self.status))
            .await?;

        let mut snapshot = ctx.read_column(&task.column_key()).await?;
        let plan = if self.status == task.status {
            plan_move(&self.id, &snapshot, None, self.order)?
        } else {
            let target_key = ColumnKey::new(self.uid.clone(), self.status.clone());
            let target = ctx.read_column(&target_key).await?;
            let plan = plan_move(
                &self.id,
                &snapshot,
                Some((&self.status, target.as_slice())),
                self.order,
            )?;
            snapshot.extend(target);
            plan
        };
        ctx.apply(&plan, &snapshot).await?;

        let moved = ctx.read_task(&self.id).await?;
        tracing::info!(
            task = %self.id,
            from = %task.status,
            to = %moved.status,
            rank = moved.rank,
            updated = plan.len(),
            "task moved"
        );
        Ok(json!({ "task": moved, "updated": plan }))
    }
}

impl Operation for MoveTask {
    fn verb(&self) -> &'static str {
        "move"
    }

    fn noun(&self) -> &'static str {
        "task"
    }

    fn actor(&self) -> Option<&str> {
        Some(self.uid.as_str())
    }
}

#[async_trait]
impl Execute<BoardContext, BoardError> for MoveTask {
    async fn execute(&self, ctx: &BoardContext) -> ExecutionResult<Value, BoardError> {
        let started = Instant::now();
        logged(self, started, self.run(ctx).await)
    }

    fn affected_resource_ids(&self, result: &Value) -> Vec<String> {
        result["updated"]
            .as_array()
            .map(|changes| {
                changes
                    .iter()
                    .filter_map(|c| c["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
