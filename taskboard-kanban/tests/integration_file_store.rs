//! Integration tests for the file-backed board

use taskboard_kanban::{
    task::{AddTask, DeleteTask, ListTasks, MoveTask},
    user::{GetUser, RegisterUser},
    BoardContext, BoardOperationProcessor, ChangeNotifier, FileTaskStore, OperationProcessor,
    TaskId, TaskStore,
};
use tempfile::TempDir;

#[test_log::test(tokio::test)]
async fn test_board_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join(".taskboard");
    let processor = BoardOperationProcessor::new();

    let (first, second) = {
        let ctx = BoardContext::open(&root, ChangeNotifier::default())
            .await
            .unwrap();
        let first = processor
            .process(&AddTask::new("alice", "First"), &ctx)
            .await
            .unwrap();
        let second = processor
            .process(&AddTask::new("alice", "Second"), &ctx)
            .await
            .unwrap();
        processor
            .process(
                &MoveTask::new(second["id"].as_str().unwrap(), "alice", "todo", 0),
                &ctx,
            )
            .await
            .unwrap();
        (first, second)
    };

    let ctx = BoardContext::open(&root, ChangeNotifier::default())
        .await
        .unwrap();
    let listed = processor.process(&ListTasks::new("alice"), &ctx).await.unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], second["id"]);
    assert_eq!(listed[0]["rank"], 0);
    assert_eq!(listed[1]["id"], first["id"]);
    assert_eq!(listed[1]["rank"], 1);
}

#[tokio::test]
async fn test_activity_log_end_to_end() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join(".taskboard");
    let ctx = BoardContext::open(&root, ChangeNotifier::default())
        .await
        .unwrap();
    let processor = BoardOperationProcessor::new();

    processor
        .process(&RegisterUser::new("alice").with_name("Alice"), &ctx)
        .await
        .unwrap();
    let task = processor
        .process(&AddTask::new("alice", "Logged"), &ctx)
        .await
        .unwrap();
    let id = TaskId::from_string(task["id"].as_str().unwrap());
    processor
        .process(&DeleteTask::new(id.clone(), "alice"), &ctx)
        .await
        .unwrap();
    // reads are not audited
    processor.process(&GetUser::new("alice"), &ctx).await.unwrap();

    let entries = ctx.store().read_activity(None).await.unwrap();
    let ops: Vec<&str> = entries.iter().map(|e| e.op.as_str()).collect();
    assert_eq!(ops, vec!["delete task", "add task", "register user"]);
    assert!(entries.iter().all(|e| e.actor.as_deref() == Some("alice")));

    let store = FileTaskStore::new(&root);
    assert!(store.activity_path().exists());
    assert!(!store.task_path(&id).exists());
    assert!(store.get_user(&"alice".into()).await.unwrap().is_some());
}
