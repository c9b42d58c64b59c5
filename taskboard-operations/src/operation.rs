//! Operation and Execute traits

use crate::ExecutionResult;
use async_trait::async_trait;
use serde_json::Value;

/// Static metadata describing a command
pub trait Operation {
    /// Action word, e.g. "move"
    fn verb(&self) -> &'static str;

    /// Target entity, e.g. "task"
    fn noun(&self) -> &'static str;

    /// Canonical op string used in audit entries ("move task")
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }

    /// Identity of whoever issued the command, if it carries one
    fn actor(&self) -> Option<&str> {
        None
    }
}

/// Run a command against a context
#[async_trait]
pub trait Execute<C, E>: Operation + Send + Sync
where
    C: Send + Sync,
    E: Send,
{
    /// Execute and report whether the outcome should be audited
    async fn execute(&self, ctx: &C) -> ExecutionResult<Value, E>;

    /// IDs of the resources touched by a successful execution
    fn affected_resource_ids(&self, result: &Value) -> Vec<String> {
        result
            .get("id")
            .and_then(|v| v.as_str())
            .map(|id| vec![id.to_string()])
            .unwrap_or_default()
    }
}
