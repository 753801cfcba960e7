//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] futurity_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] futurity_session::SessionError),

    #[error("Subject API error: {0}")]
    Subject(#[from] futurity_subjects::SubjectError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
