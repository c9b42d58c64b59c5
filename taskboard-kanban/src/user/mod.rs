//! User commands

mod get;
mod register;

pub use get::GetUser;
pub use register::RegisterUser;
