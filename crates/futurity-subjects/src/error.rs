//! Subject API error types

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubjectError {
    #[error("Subject with fsid \"{0}\" not found")]
    NotFound(String),

    #[error("Authentication required. Please log in again.")]
    AuthRequired,

    #[error("You do not have permission to modify this whiteboard.")]
    Forbidden,

    #[error("Whiteboard not found.")]
    WhiteboardNotFound,

    #[error("Failed to {action}: {status}")]
    Status {
        action: &'static str,
        status: StatusCode,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SubjectError {
    /// HTTP status behind this error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SubjectError::NotFound(_) | SubjectError::WhiteboardNotFound => {
                Some(StatusCode::NOT_FOUND)
            }
            SubjectError::AuthRequired => Some(StatusCode::UNAUTHORIZED),
            SubjectError::Forbidden => Some(StatusCode::FORBIDDEN),
            SubjectError::Status { status, .. } => Some(*status),
            SubjectError::Http(e) => e.status(),
            SubjectError::Json(_) => None,
        }
    }
}
