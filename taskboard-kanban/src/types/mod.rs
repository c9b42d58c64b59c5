//! Board data types

mod ids;
mod task;
mod user;

pub use ids::{ColumnId, ColumnKey, TaskId, Uid};
pub use task::Task;
pub use user::User;
