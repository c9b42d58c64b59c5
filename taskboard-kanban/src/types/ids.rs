//! Identifier newtypes

use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing string without validation
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Task identifier (ULID)
    TaskId
);
string_id!(
    /// Opaque owner identifier supplied by clients
    Uid
);
string_id!(
    /// Status label naming a column ("todo", "in-progress", "done", ...)
    ColumnId
);

impl TaskId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Parse a client-supplied identifier, rejecting anything that is not a ULID
    pub fn parse(s: &str) -> Result<Self> {
        ulid::Ulid::from_string(s)
            .map(|u| Self(u.to_string()))
            .map_err(|_| BoardError::InvalidId { id: s.to_string() })
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnId {
    /// Column new tasks land in when the client names none
    pub fn todo() -> Self {
        Self("todo".to_string())
    }
}

/// A column partition: the tasks one owner keeps under one status
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnKey {
    pub uid: Uid,
    pub status: ColumnId,
}

impl ColumnKey {
    pub fn new(uid: Uid, status: ColumnId) -> Self {
        Self { uid, status }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.uid, self.status)
    }
}
