//! DeleteTask command

use crate::audit::logged;
use crate::context::BoardContext;
use crate::error::{BoardError, Result};
use crate::order::plan_compact;
use crate::types::{TaskId, Uid};
use crate::validate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use taskboard_operations::{async_trait, Execute, ExecutionResult, Operation};

/// Delete a task and close the gap it leaves in its column
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteTask {
    /// The task ID to delete
    pub id: TaskId,
    /// Requester; must own the task
    pub uid: Uid,
}

impl DeleteTask {
    /// Create a new DeleteTask command
    pub fn new(id: impl Into<TaskId>, uid: impl Into<Uid>) -> Self {
        Self {
            id: id.into(),
            uid: uid.into(),
        }
    }

    async fn run(&self, ctx: &BoardContext) -> Result<Value> {
        validate::uid(&self.uid)?;

        let (task, _guard) = ctx.lock_owned_task(&self.id, &self.uid, None).await?;
        let column = ctx.read_column(&task.column_key()).await?;
        let plan = plan_compact(&column, &self.id);

        if !ctx.store().delete_task(&self.id).await? {
            return Err(BoardError::TaskNotFound {
                id: self.id.to_string(),
            });
        }
        if let Err(e) = ctx.apply(&plan, &column).await {
            if let Err(restore) = ctx.store().insert_task(&task).await {
                tracing::error!(task = %self.id, error = %restore, "failed to restore deleted task");
            }
            return Err(e);
        }

        tracing::info!(task = %self.id, column = %task.column_key(), compacted = plan.len(), "task deleted");
        Ok(json!({
            "message": "Task deleted",
            "id": self.id,
            "updated": plan,
        }))
    }
}

impl Operation for DeleteTask {
    fn verb(&self) -> &'static str {
        "delete"
    }

    fn noun(&self) -> &'static str {
        "task"
    }

    fn actor(&self) -> Option<&str> {
        Some(self.uid.as_str())
    }
}

#[async_trait]
impl Execute<BoardContext, BoardError> for DeleteTask {
    async fn execute(&self, ctx: &BoardContext) -> ExecutionResult<Value, BoardError> {
        let started = Instant::now();
        logged(self, started, self.run(ctx).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ChangeNotifier;
    use crate::store::FailingPlacementStore;
    use crate::task::AddTask;
    use crate::types::{ColumnId, ColumnKey};
    use std::sync::Arc;

    async fn seed(ctx: &BoardContext, titles: &[&str]) -> Vec<TaskId> {
        let mut ids = Vec::new();
        for title in titles {
            let result = AddTask::new("alice", *title)
                .execute(ctx)
                .await
                .into_result()
                .unwrap();
            ids.push(TaskId::from_string(result["id"].as_str().unwrap()));
        }
        ids
    }

    #[tokio::test]
    async fn test_delete_compacts_column() {
        let ctx = BoardContext::in_memory();
        let ids = seed(&ctx, &["A", "B", "C", "D"]).await;

        let result = DeleteTask::new(ids[1].clone(), "alice")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["message"], "Task deleted");
        assert_eq!(result["updated"].as_array().unwrap().len(), 2);

        let column = ctx
            .read_column(&ColumnKey::new("alice".into(), ColumnId::todo()))
            .await
            .unwrap();
        let placed: Vec<(&str, u32)> = column.iter().map(|t| (t.title.as_str(), t.rank)).collect();
        assert_eq!(placed, vec![("A", 0), ("C", 1), ("D", 2)]);
    }

    #[tokio::test]
    async fn test_delete_last_task() {
        let ctx = BoardContext::in_memory();
        let ids = seed(&ctx, &["A"]).await;

        let result = DeleteTask::new(ids[0].clone(), "alice")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["updated"], json!([]));
        assert!(ctx.store().get_task(&ids[0]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_rejected() {
        let ctx = BoardContext::in_memory();
        let ids = seed(&ctx, &["A"]).await;

        let result = DeleteTask::new(ids[0].clone(), "mallory")
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(BoardError::Unauthorized { .. })));
        assert!(ctx.store().get_task(&ids[0]).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_compaction_restores_column() {
        for allowed in [0, 1] {
            let store = FailingPlacementStore::new(allowed);
            let ctx = BoardContext::new(Arc::new(store), ChangeNotifier::default());
            let ids = seed(&ctx, &["A", "B", "C"]).await;

            let result = DeleteTask::new(ids[0].clone(), "alice")
                .execute(&ctx)
                .await
                .into_result();
            assert!(matches!(result, Err(BoardError::Store(_))));

            let column = ctx
                .read_column(&ColumnKey::new("alice".into(), ColumnId::todo()))
                .await
                .unwrap();
            let placed: Vec<(&str, u32)> =
                column.iter().map(|t| (t.title.as_str(), t.rank)).collect();
            assert_eq!(placed, vec![("A", 0), ("B", 1), ("C", 2)]);
        }
    }

    #[tokio::test]
    async fn test_delete_missing_task() {
        let ctx = BoardContext::in_memory();
        let result = DeleteTask::new(TaskId::new(), "alice")
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(BoardError::TaskNotFound { .. })));
    }
}
