//! GetUser command

use crate::audit::unlogged;
use crate::context::BoardContext;
use crate::error::{BoardError, Result};
use crate::types::Uid;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskboard_operations::{async_trait, Execute, ExecutionResult, Operation};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GetUser {
    pub uid: Uid,
}

impl GetUser {
    pub fn new(uid: impl Into<Uid>) -> Self {
        Self { uid: uid.into() }
    }

    async fn run(&self, ctx: &BoardContext) -> Result<Value> {
        let user = ctx
            .store()
            .get_user(&self.uid)
            .await?
            .ok_or_else(|| BoardError::UserNotFound {
                uid: self.uid.to_string(),
            })?;
        Ok(serde_json::to_value(&user)?)
    }
}

impl Operation for GetUser {
    fn verb(&self) -> &'static str {
        "get"
    }

    fn noun(&self) -> &'static str {
        "user"
    }
}

#[async_trait]
impl Execute<BoardContext, BoardError> for GetUser {
    async fn execute(&self, ctx: &BoardContext) -> ExecutionResult<Value, BoardError> {
        unlogged(self.run(ctx).await)
    }

    fn affected_resource_ids(&self, _result: &Value) -> Vec<String> {
        Vec::new()
    }
}
