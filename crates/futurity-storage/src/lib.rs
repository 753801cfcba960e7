//! Futurity Storage Layer
//!
//! SQLite-backed durable storage for client state that must survive restarts:
//! the bearer token and the currently selected team.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Key under which the reduced projection of the current team is stored.
pub const CURRENT_TEAM_KEY: &str = "futurity_current_team";

/// Key under which the bearer token is stored.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
