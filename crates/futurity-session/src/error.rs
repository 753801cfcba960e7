//! Session error types

use thiserror::Error;

use crate::service::ServiceError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Storage error: {0}")]
    Storage(#[from] futurity_storage::StorageError),
}

impl SessionError {
    /// True when the remote side rejected the credentials (401/403).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, SessionError::Service(e) if e.is_auth_failure())
    }
}
