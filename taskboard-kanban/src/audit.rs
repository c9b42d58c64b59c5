//! Turn a command's outcome into an auditable execution result

use crate::error::{BoardError, Result};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use taskboard_operations::{ExecutionResult, LogEntry, Operation};

/// Wrap the outcome of a mutating command, attaching a log entry either way
pub(crate) fn logged<O>(op: &O, started: Instant, result: Result<Value>) -> ExecutionResult<Value, BoardError>
where
    O: Operation + Serialize,
{
    let duration_ms = started.elapsed().as_millis() as u64;
    let input = serde_json::to_value(op).unwrap_or(Value::Null);
    let actor = op.actor().map(str::to_string);

    match result {
        Ok(value) => ExecutionResult::Logged {
            log_entry: LogEntry::new(op.op_string(), input, value.clone(), actor, duration_ms),
            value,
        },
        Err(error) => {
            let output = serde_json::json!({ "error": error.to_string() });
            ExecutionResult::Failed {
                error,
                log_entry: Some(LogEntry::new(op.op_string(), input, output, actor, duration_ms)),
            }
        }
    }
}

/// Wrap the outcome of a read-only command
pub(crate) fn unlogged(result: Result<Value>) -> ExecutionResult<Value, BoardError> {
    match result {
        Ok(value) => ExecutionResult::Unlogged { value },
        Err(error) => ExecutionResult::Failed {
            error,
            log_entry: None,
        },
    }
}
