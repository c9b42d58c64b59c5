//! Task board engine: ordering, locking and change notification
//!
//! Every user owns a set of columns (one per status label). Within each
//! (owner, status) column the task ranks always form `0..n` with no gaps or
//! duplicates. Commands keep that invariant by computing reconciliations
//! while holding the column lock, and the processor signals connected
//! observers once a mutation has committed.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use taskboard_kanban::{
//!     task::{AddTask, MoveTask},
//!     BoardContext, BoardOperationProcessor, OperationProcessor,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = BoardContext::in_memory();
//! let processor = BoardOperationProcessor::new();
//!
//! let task = processor
//!     .process(&AddTask::new("alice", "Write release notes"), &ctx)
//!     .await?;
//! let id = task["id"].as_str().unwrap_or_default();
//!
//! processor
//!     .process(&MoveTask::new(id, "alice", "done", 0), &ctx)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage Structure
//!
//! ```text
//! .taskboard/
//! ├── tasks/
//! │   └── {id}.json        # One task per file
//! ├── users/
//! │   └── {uid}.json       # One user per file (uid percent-encoded)
//! └── activity/
//!     └── current.jsonl    # Operation log
//! ```

mod audit;
mod context;
mod error;
pub mod lock;
pub mod notify;
pub mod order;
mod processor;
pub mod store;
pub mod types;
pub mod validate;

// Command modules
pub mod task;
pub mod user;

pub use context::BoardContext;
pub use error::{BoardError, Result};
pub use lock::{ColumnGuard, ColumnLocks};
pub use notify::{BoardChanged, ChangeNotifier, ChangeSubscription, TASKS_CHANGED};
pub use processor::BoardOperationProcessor;
pub use store::{FileTaskStore, MemoryTaskStore, TaskStore};
pub use types::{ColumnId, ColumnKey, Task, TaskId, Uid, User};

// Re-export operation processing traits
pub use taskboard_operations::{
    async_trait, Execute, ExecutionResult, LogEntry, Operation, OperationProcessor,
};
