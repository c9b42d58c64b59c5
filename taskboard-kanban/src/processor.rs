//! Board operation processor
//!
//! Runs a command, appends its log entry to the activity log and, once a
//! mutation has committed, signals every connected observer.

use crate::context::BoardContext;
use crate::error::{BoardError, Result};
use async_trait::async_trait;
use serde_json::Value;
use taskboard_operations::{Execute, Operation, OperationProcessor};

/// Processor for board operations
#[derive(Debug, Default, Clone, Copy)]
pub struct BoardOperationProcessor;

impl BoardOperationProcessor {
    /// Create a new processor
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OperationProcessor<BoardContext, BoardError> for BoardOperationProcessor {
    async fn process<O>(&self, operation: &O, ctx: &BoardContext) -> Result<Value>
    where
        O: Execute<BoardContext, BoardError> + 'static,
    {
        let exec_result = operation.execute(ctx).await;
        let committed = exec_result.is_committed_mutation();
        let (result, log_entry) = exec_result.split();

        if let Some(entry) = log_entry {
            if let Err(e) = ctx.store().append_activity(&entry).await {
                tracing::warn!(op = %entry.op, error = %e, "failed to append activity entry");
            }
        }

        match &result {
            Ok(value) if committed => {
                let observers = ctx.notifier().notify();
                tracing::debug!(
                    op = %operation.op_string(),
                    affected = ?operation.affected_resource_ids(value),
                    observers,
                    "change signalled"
                );
            }
            Err(e) if e.is_store_failure() => {
                tracing::error!(op = %operation.op_string(), error = %e, "operation failed in the store");
            }
            Err(e) => {
                tracing::debug!(op = %operation.op_string(), error = %e, "operation rejected");
            }
            Ok(_) => {}
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{AddTask, DeleteTask, ListTasks, MoveTask};
    use crate::types::TaskId;
    use std::time::Duration;

    async fn signalled(observer: &mut crate::notify::ChangeSubscription) -> bool {
        tokio::time::timeout(Duration::from_millis(50), observer.changed())
            .await
            .is_ok()
    }

    #[tokio::test]
    async fn test_mutations_are_logged_and_signalled() {
        let ctx = BoardContext::in_memory();
        let mut observer = ctx.notifier().subscribe();
        let processor = BoardOperationProcessor::new();

        let created = processor
            .process(&AddTask::new("alice", "Audit me"), &ctx)
            .await
            .unwrap();
        assert!(signalled(&mut observer).await);

        let activity = ctx.store().read_activity(None).await.unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].op, "add task");
        assert_eq!(activity[0].actor.as_deref(), Some("alice"));
        assert_eq!(activity[0].output["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_reads_are_neither_logged_nor_signalled() {
        let ctx = BoardContext::in_memory();
        let mut observer = ctx.notifier().subscribe();
        let processor = BoardOperationProcessor::new();

        processor.process(&ListTasks::new("alice"), &ctx).await.unwrap();

        assert!(ctx.store().read_activity(None).await.unwrap().is_empty());
        assert!(!signalled(&mut observer).await);
    }

    #[tokio::test]
    async fn test_failures_are_logged_but_not_signalled() {
        let ctx = BoardContext::in_memory();
        let mut observer = ctx.notifier().subscribe();
        let processor = BoardOperationProcessor::new();

        let created = processor
            .process(&AddTask::new("alice", "Mine"), &ctx)
            .await
            .unwrap();
        assert!(signalled(&mut observer).await);
        let id = TaskId::from_string(created["id"].as_str().unwrap());

        let denied = processor
            .process(&MoveTask::new(id.clone(), "mallory", "done", 0), &ctx)
            .await;
        assert!(matches!(denied, Err(BoardError::Unauthorized { .. })));

        let missing = processor
            .process(&DeleteTask::new(TaskId::new(), "alice"), &ctx)
            .await;
        assert!(matches!(missing, Err(BoardError::TaskNotFound { .. })));

        let activity = ctx.store().read_activity(None).await.unwrap();
        assert_eq!(activity.len(), 3);
        assert!(activity[0].output.get("error").is_some());
        assert!(!signalled(&mut observer).await);
    }
}
