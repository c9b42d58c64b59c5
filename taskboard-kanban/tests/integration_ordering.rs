//! Integration tests for column ordering under concurrent edits

use std::collections::HashMap;
use std::sync::Arc;
use taskboard_kanban::{
    task::{AddTask, DeleteTask, ListTasks, MoveTask, ReorderColumn, UpdateTask},
    BoardContext, BoardError, BoardOperationProcessor, OperationProcessor, TaskId,
};

/// Ranks grouped per column, as returned by ListTasks
async fn ranks_by_column(ctx: &BoardContext, uid: &str) -> HashMap<String, Vec<u64>> {
    let tasks = BoardOperationProcessor::new()
        .process(&ListTasks::new(uid), ctx)
        .await
        .unwrap();
    let mut columns: HashMap<String, Vec<u64>> = HashMap::new();
    for task in tasks.as_array().unwrap() {
        columns
            .entry(task["status"].as_str().unwrap().to_string())
            .or_default()
            .push(task["rank"].as_u64().unwrap());
    }
    columns
}

fn assert_contiguous(columns: &HashMap<String, Vec<u64>>) {
    for (status, ranks) in columns {
        let expected: Vec<u64> = (0..ranks.len() as u64).collect();
        assert_eq!(ranks, &expected, "column {status} is not contiguous");
    }
}

#[tokio::test]
async fn test_create_move_update_delete_keeps_columns_contiguous() {
    let ctx = BoardContext::in_memory();
    let processor = BoardOperationProcessor::new();

    let mut ids = Vec::new();
    for i in 0..6 {
        let status = if i % 2 == 0 { "todo" } else { "doing" };
        let task = processor
            .process(&AddTask::new("alice", format!("Task {i}")).with_status(status), &ctx)
            .await
            .unwrap();
        ids.push(TaskId::from_string(task["id"].as_str().unwrap()));
    }
    assert_contiguous(&ranks_by_column(&ctx, "alice").await);

    processor
        .process(&MoveTask::new(ids[0].clone(), "alice", "doing", 1), &ctx)
        .await
        .unwrap();
    assert_contiguous(&ranks_by_column(&ctx, "alice").await);

    processor
        .process(&UpdateTask::new(ids[1].clone(), "alice").with_status("done"), &ctx)
        .await
        .unwrap();
    assert_contiguous(&ranks_by_column(&ctx, "alice").await);

    processor
        .process(&DeleteTask::new(ids[3].clone(), "alice"), &ctx)
        .await
        .unwrap();
    let columns = ranks_by_column(&ctx, "alice").await;
    assert_contiguous(&columns);
    assert_eq!(columns["todo"].len(), 2);
    assert_eq!(columns["doing"].len(), 2);
    assert_eq!(columns["done"].len(), 1);
}

#[tokio::test]
async fn test_concurrent_traffic_across_columns_stays_contiguous() {
    let ctx = Arc::new(BoardContext::in_memory());
    let processor = BoardOperationProcessor::new();

    let mut ids = Vec::new();
    for i in 0..8 {
        let task = processor
            .process(&AddTask::new("alice", format!("Task {i}")), &ctx)
            .await
            .unwrap();
        ids.push(TaskId::from_string(task["id"].as_str().unwrap()));
    }

    let mut handles = Vec::new();
    for (i, id) in ids.iter().cloned().enumerate() {
        let ctx = Arc::clone(&ctx);
        handles.push(tokio::spawn(async move {
            let processor = BoardOperationProcessor::new();
            let status = ["todo", "doing", "done"][i % 3];
            processor
                .process(&MoveTask::new(id.clone(), "alice", status, 0), &ctx)
                .await
                .unwrap();
            processor
                .process(&AddTask::new("alice", format!("Late {i}")).with_status(status), &ctx)
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let columns = ranks_by_column(&ctx, "alice").await;
    assert_contiguous(&columns);
    assert_eq!(columns.values().map(Vec::len).sum::<usize>(), 16);
}

#[tokio::test]
async fn test_owners_never_touch_each_others_columns() {
    let ctx = BoardContext::in_memory();
    let processor = BoardOperationProcessor::new();

    let alice = processor
        .process(&AddTask::new("alice", "Alice's"), &ctx)
        .await
        .unwrap();
    let bob = processor
        .process(&AddTask::new("bob", "Bob's"), &ctx)
        .await
        .unwrap();
    // separate partitions both start at rank 0
    assert_eq!(alice["rank"], 0);
    assert_eq!(bob["rank"], 0);

    let alice_id = TaskId::from_string(alice["id"].as_str().unwrap());
    let attempts = [
        processor
            .process(&MoveTask::new(alice_id.clone(), "bob", "done", 0), &ctx)
            .await,
        processor
            .process(&UpdateTask::new(alice_id.clone(), "bob").with_title("mine"), &ctx)
            .await,
        processor
            .process(&DeleteTask::new(alice_id.clone(), "bob"), &ctx)
            .await,
    ];
    for attempt in attempts {
        assert!(matches!(attempt, Err(BoardError::Unauthorized { .. })));
    }

    let reorder = processor
        .process(&ReorderColumn::new("bob", "todo", vec![alice_id]), &ctx)
        .await;
    assert!(matches!(reorder, Err(BoardError::InvalidReorderSet { .. })));

    let listed = processor.process(&ListTasks::new("alice"), &ctx).await.unwrap();
    assert_eq!(listed[0]["title"], "Alice's");
    assert_eq!(listed[0]["status"], "todo");
}
