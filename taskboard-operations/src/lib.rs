//! # Task Board Operations
//!
//! This crate provides the `Operation` and `Execute` traits shared by every
//! board command. Commands are structs whose fields ARE the parameters; the
//! context they run against is supplied by the caller.
//!
//! ## Example
//!
//! ```ignore
//! use taskboard_operations::*;
//!
//! #[derive(Debug, Deserialize, Serialize)]
//! pub struct DeleteTask {
//!     pub id: TaskId,
//!     pub uid: String,
//! }
//!
//! impl Operation for DeleteTask {
//!     fn verb(&self) -> &'static str { "delete" }
//!     fn noun(&self) -> &'static str { "task" }
//! }
//!
//! #[async_trait]
//! impl Execute<BoardContext, BoardError> for DeleteTask {
//!     async fn execute(&self, ctx: &BoardContext) -> ExecutionResult<Value, BoardError> {
//!         // implementation returns ExecutionResult::Logged or Unlogged
//!     }
//! }
//! ```

mod execution_result;
mod log;
mod operation;
mod processor;

pub use execution_result::ExecutionResult;
pub use log::LogEntry;
pub use operation::{Execute, Operation};
pub use processor::OperationProcessor;

// Re-export for use in implementations
pub use async_trait::async_trait;
pub use serde_json::Value;
