//! ReorderColumn command

use crate::audit::logged;
use crate::context::BoardContext;
use crate::error::{BoardError, Result};
use crate::order::plan_bulk;
use crate::types::{ColumnId, ColumnKey, TaskId, Uid};
use crate::validate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use taskboard_operations::{async_trait, Execute, ExecutionResult, Operation};

/// Replace the order of a whole column with an explicit list of task ids
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReorderColumn {
    pub uid: Uid,
    pub status: ColumnId,
    /// Every task of the column, first to last
    pub order: Vec<TaskId>,
}

impl ReorderColumn {
    pub fn new(uid: impl Into<Uid>, status: impl Into<ColumnId>, order: Vec<TaskId>) -> Self {
        Self {
            uid: uid.into(),
            status: status.into(),
            order,
        }
    }

    async fn run(&self, ctx: &BoardContext) -> Result<Value> {
        validate::uid(&self.uid)?;
        validate::status(&self.status)?;

        let key = ColumnKey::new(self.uid.clone(), self.status.clone());
        let _guard = ctx.lock_column(&key).await;

        let column = ctx.read_column(&key).await?;
        let plan = plan_bulk(&column, &self.status, &self.order)?;
        ctx.apply(&plan, &column).await?;

        tracing::info!(column = %key, updated = plan.len(), "column reordered");
        Ok(json!({ "status": self.status, "updated": plan }))
    }
}

impl Operation for ReorderColumn {
    fn verb(&self) -> &'static str {
        "reorder"
    }

    fn noun(&self) -> &'static str {
        "column"
    }

    fn actor(&self) -> Option<&str> {
        Some(self.uid.as_str())
    }
}

#[async_trait]
impl Execute<BoardContext, BoardError> for ReorderColumn {
    async fn execute(&self, ctx: &BoardContext) -> ExecutionResult<Value, BoardError> {
        let started = Instant::now();
        logged(self, started, self.run(ctx).await)
    }

    fn affected_resource_ids(&self, _result: &Value) -> Vec<String> {
        self.order.iter().map(|id| id.to_string()).collect()
    }
}
