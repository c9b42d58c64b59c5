//! UpdateTask command

use crate::audit::logged;
use crate::context::BoardContext;
use crate::error::{BoardError, Result};
use crate::order::{plan_move, Reconciliation};
use crate::types::{ColumnId, ColumnKey, TaskId, Uid};
use crate::validate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use taskboard_operations::{async_trait, Execute, ExecutionResult, Operation};

/// Update the mutable fields of a task.
///
/// Only `title`, `description`, `status` and `rank` can change. A new status
/// or rank is carried out as a move, so both columns stay contiguous; a new
/// status without a rank appends the task to the end of that column.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTask {
    /// The task ID to update
    pub id: TaskId,
    /// Requester; must own the task
    pub uid: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ColumnId>,
    /// Target position within the (new) column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl UpdateTask {
    /// Create a new UpdateTask command
    pub fn new(id: impl Into<TaskId>, uid: impl Into<Uid>) -> Self {
        Self {
            id: id.into(),
            uid: uid.into(),
            title: None,
            description: None,
            status: None,
            rank: None,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
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

    /// Set the target rank
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    fn validate(&self) -> Result<()> {
        validate::uid(&self.uid)?;
        if let Some(title) = &self.title {
            validate::title(title)?;
        }
        if let Some(description) = &self.description {
            validate::description(description)?;
        }
        if let Some(status) = &self.status {
            validate::status(status)?;
        }
        Ok(())
    }

    fn unchanged(&self) -> BoardError {
        BoardError::Unchanged {
            id: self.id.to_string(),
        }
    }

    async fn run(&self, ctx: &BoardContext) -> Result<Value> {
        self.validate()?;
        if self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.rank.is_none()
        {
            return Err(self.unchanged());
        }

        let (task, _guard) = ctx
            .lock_owned_task(&self.id, &self.uid, self.status.as_ref())
            .await?;

        let mut updated = task.clone();
        if let Some(title) = &self.title {
            updated.title = title.clone();
        }
        if let Some(description) = &self.description {
            updated.description = description.clone();
        }
        let content_changed =
            updated.title != task.title || updated.description != task.description;

        let target_status = self.status.clone().unwrap_or_else(|| task.status.clone());
        let (plan, snapshot) = if target_status != task.status {
            let mut source = ctx.read_column(&task.column_key()).await?;
            let target = ctx
                .read_column(&ColumnKey::new(self.uid.clone(), target_status.clone()))
                .await?;
            let position = self.rank.map_or(target.len(), |r| r as usize);
            let plan = plan_move(
                &self.id,
                &source,
                Some((&target_status, target.as_slice())),
                position,
            )?;
            source.extend(target);
            (plan, source)
        } else if let Some(rank) = self.rank {
            let source = ctx.read_column(&task.column_key()).await?;
            (plan_move(&self.id, &source, None, rank as usize)?, source)
        } else {
            (Reconciliation::default(), Vec::new())
        };

        if !content_changed && plan.is_empty() {
            return Err(self.unchanged());
        }

        // The task's own content and placement go out in a single write
        let placement = plan.rank_of(&self.id);
        if let Some(rank) = placement {
            updated.status = target_status;
            updated.rank = rank;
        }
        let own_write = content_changed || placement.is_some();
        if own_write {
            ctx.store().update_task(&updated).await?;
        }
        if let Err(e) = ctx.apply(&plan.without(&self.id), &snapshot).await {
            if own_write {
                ctx.restore([&task]).await;
            }
            return Err(e);
        }

        let stored = ctx.read_task(&self.id).await?;
        tracing::info!(
            task = %self.id,
            content_changed,
            reranked = plan.len(),
            "task updated"
        );
        Ok(serde_json::to_value(&stored)?)
    }
}

impl Operation for UpdateTask {
    fn verb(&self) -> &'static str {
        "update"
    }

    fn noun(&self) -> &'static str {
        "task"
    }

    fn actor(&self) -> Option<&str> {
        Some(self.uid.as_str())
    }
}

#[async_trait]
impl Execute<BoardContext, BoardError> for UpdateTask {
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
    use std::sync::Arc;

    async fn add(ctx: &BoardContext, title: &str, status: &str) -> TaskId {
        let result = AddTask::new("alice", title)
            .with_status(status)
            .execute(ctx)
            .await
            .into_result()
            .unwrap();
        TaskId::from_string(result["id"].as_str().unwrap())
    }

    async fn ranks(ctx: &BoardContext, status: &str) -> Vec<(String, u32)> {
        ctx.read_column(&ColumnKey::new("alice".into(), status.into()))
            .await
            .unwrap()
            .into_iter()
            .map(|t| (t.title, t.rank))
            .collect()
    }

    #[tokio::test]
    async fn test_update_task_title() {
        let ctx = BoardContext::in_memory();
        let id = add(&ctx, "Original", "todo").await;

        let result = UpdateTask::new(id, "alice")
            .with_title("Updated")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["title"], "Updated");
        assert_eq!(result["rank"], 0);
    }

    #[tokio::test]
    async fn test_update_task_description() {
        let ctx = BoardContext::in_memory();
        let id = add(&ctx, "Task", "todo").await;

        let result = UpdateTask::new(id, "alice")
            .with_description("New description")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["description"], "New description");
    }

    #[tokio::test]
    async fn test_update_with_same_values_is_unchanged() {
        let ctx = BoardContext::in_memory();
        let id = add(&ctx, "Task", "todo").await;

        let same = UpdateTask::new(id.clone(), "alice")
            .with_title("Task")
            .with_status("todo")
            .with_rank(0)
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(same, Err(BoardError::Unchanged { .. })));

        let empty = UpdateTask::new(id, "alice").execute(&ctx).await.into_result();
        assert!(matches!(empty, Err(BoardError::Unchanged { .. })));
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_rejected() {
        let ctx = BoardContext::in_memory();
        let id = add(&ctx, "Task", "todo").await;

        let result = UpdateTask::new(id.clone(), "mallory")
            .with_title("Pwned")
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(BoardError::Unauthorized { .. })));

        let stored = ctx.read_task(&id).await.unwrap();
        assert_eq!(stored.title, "Task");
    }

    #[tokio::test]
    async fn test_status_change_appends_and_compacts() {
        let ctx = BoardContext::in_memory();
        let a = add(&ctx, "A", "todo").await;
        add(&ctx, "B", "todo").await;
        add(&ctx, "C", "done").await;

        let result = UpdateTask::new(a, "alice")
            .with_status("done")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["status"], "done");
        assert_eq!(result["rank"], 1);
        assert_eq!(ranks(&ctx, "todo").await, vec![("B".to_string(), 0)]);
        assert_eq!(
            ranks(&ctx, "done").await,
            vec![("C".to_string(), 0), ("A".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_rank_change_within_column() {
        let ctx = BoardContext::in_memory();
        add(&ctx, "A", "todo").await;
        add(&ctx, "B", "todo").await;
        let c = add(&ctx, "C", "todo").await;

        UpdateTask::new(c, "alice")
            .with_rank(0)
            .with_title("C2")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(
            ranks(&ctx, "todo").await,
            vec![
                ("C2".to_string(), 0),
                ("A".to_string(), 1),
                ("B".to_string(), 2)
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_fields_are_rejected() {
        let ctx = BoardContext::in_memory();
        let id = add(&ctx, "Task", "todo").await;

        let result = UpdateTask::new(id.clone(), "alice")
            .with_title("")
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(BoardError::Validation { .. })));

        let result = UpdateTask::new(id, "alice")
            .with_rank(9)
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(BoardError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_failed_placement_leaves_task_untouched() {
        let store = FailingPlacementStore::new(0);
        let ctx = BoardContext::new(Arc::new(store), ChangeNotifier::default());
        let a = add(&ctx, "A", "todo").await;
        add(&ctx, "B", "todo").await;

        let result = UpdateTask::new(a.clone(), "alice")
            .with_title("CHANGED")
            .with_status("done")
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(BoardError::Store(_))));

        let stored = ctx.read_task(&a).await.unwrap();
        assert_eq!(stored.title, "A");
        assert_eq!(stored.status.as_str(), "todo");
        assert_eq!(
            ranks(&ctx, "todo").await,
            vec![("A".to_string(), 0), ("B".to_string(), 1)]
        );
        assert!(ranks(&ctx, "done").await.is_empty());
    }

    #[tokio::test]
    async fn test_own_placement_needs_no_separate_write() {
        let store = FailingPlacementStore::new(0);
        let ctx = BoardContext::new(Arc::new(store), ChangeNotifier::default());
        let a = add(&ctx, "A", "todo").await;

        let result = UpdateTask::new(a, "alice")
            .with_title("Renamed")
            .with_status("done")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["title"], "Renamed");
        assert_eq!(result["status"], "done");
        assert_eq!(result["rank"], 0);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let parsed: std::result::Result<UpdateTask, _> = serde_json::from_value(serde_json::json!({
            "id": "01J0000000000000000000000",
            "uid": "alice",
            "priority": "high"
        }));
        assert!(parsed.is_err());
    }
}
