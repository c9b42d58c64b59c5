//! RegisterUser command

use crate::audit::logged;
use crate::context::BoardContext;
use crate::error::{BoardError, Result};
use crate::types::{Uid, User};
use crate::validate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use taskboard_operations::{async_trait, Execute, ExecutionResult, Operation};

/// Record a user the first time they are seen.
///
/// Registering a uid that already exists returns the stored user untouched.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterUser {
    pub uid: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl RegisterUser {
    pub fn new(uid: impl Into<Uid>) -> Self {
        Self {
            uid: uid.into(),
            name: None,
            email: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    async fn run(&self, ctx: &BoardContext) -> Result<Value> {
        validate::uid(&self.uid)?;
        let mut user = User::new(self.uid.clone());
        if let Some(name) = &self.name {
            validate::name(name)?;
            user = user.with_name(name.clone());
        }
        if let Some(email) = &self.email {
            validate::email(email)?;
            user = user.with_email(email.clone());
        }

        let stored = ctx.store().insert_user_if_absent(&user).await?;
        if stored.created_at == user.created_at {
            tracing::info!(uid = %stored.uid, "user registered");
        } else {
            tracing::debug!(uid = %stored.uid, "user already registered");
        }
        Ok(serde_json::to_value(&stored)?)
    }
}

impl Operation for RegisterUser {
    fn verb(&self) -> &'static str {
        "register"
    }

    fn noun(&self) -> &'static str {
        "user"
    }

    fn actor(&self) -> Option<&str> {
        Some(self.uid.as_str())
    }
}

#[async_trait]
impl Execute<BoardContext, BoardError> for RegisterUser {
    async fn execute(&self, ctx: &BoardContext) -> ExecutionResult<Value, BoardError> {
        let started = Instant::now();
        logged(self, started, self.run(ctx).await)
    }

    fn affected_resource_ids(&self, _result: &Value) -> Vec<String> {
        vec![self.uid.to_string()]
    }
}
