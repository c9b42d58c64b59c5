//! HTTP and WebSocket front end for the task board
//!
//! Exposes the board commands as a small REST API and pushes a
//! `task-updated` text frame to every `/ws` client after each committed
//! change, so clients know to re-fetch.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;
pub mod ws;

pub use config::{ConfigError, ConfigOverrides, ServerConfig, StorageKind};
pub use error::ApiError;
pub use server::{app, serve, start_server};
pub use state::AppState;
