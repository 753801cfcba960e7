//! Remote collaborators of the session manager

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::model::{
    Credentials, ExtendedProfile, Lab, LoginResponse, Relationships, User, WhiteboardRef,
    Workspace, WorkspaceSummary,
};

/// Failure reported by a collaborator service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Unauthorized (401): {0}")]
    Unauthorized(String),

    #[error("Forbidden (403): {0}")]
    Forbidden(String),

    #[error("Not found (404): {0}")]
    NotFound(String),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => ServiceError::Unauthorized(message),
            403 => ServiceError::Forbidden(message),
            404 => ServiceError::NotFound(message),
            _ => ServiceError::Status { status, message },
        }
    }

    /// The credentials were rejected; retrying with them is pointless.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ServiceError::Unauthorized(_) | ServiceError::Forbidden(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Unauthorized(_) => Some(401),
            ServiceError::Forbidden(_) => Some(403),
            ServiceError::NotFound(_) => Some(404),
            ServiceError::Status { status, .. } => Some(*status),
            ServiceError::Network(_) | ServiceError::Decode(_) => None,
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a token to its user. A rotated token comes back as `auth_key`.
    async fn verify_token(&self, token: &str) -> ServiceResult<User>;

    async fn login(&self, credentials: &Credentials) -> ServiceResult<LoginResponse>;

    async fn logout(&self, token: Option<&str>) -> ServiceResult<()>;
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_extended_user_data(
        &self,
        user_id: &str,
        token: &str,
    ) -> ServiceResult<ExtendedProfile>;

    async fn get_user_whiteboard(&self, user_id: &str, token: &str)
        -> ServiceResult<WhiteboardRef>;

    async fn get_user_workspaces(&self, token: &str) -> ServiceResult<Vec<WorkspaceSummary>>;
}

#[async_trait]
pub trait RelationshipService: Send + Sync {
    async fn get_user_relationships(&self, user_id: &str, token: &str)
        -> ServiceResult<Relationships>;
}

#[async_trait]
pub trait WorkspaceService: Send + Sync {
    async fn get_workspace(&self, workspace_id: &str, token: &str) -> ServiceResult<Workspace>;
}

#[async_trait]
pub trait LabService: Send + Sync {
    async fn get_labs_for_team(
        &self,
        team_id: &str,
        token: &str,
        include_archived: bool,
    ) -> ServiceResult<Vec<Lab>>;
}

/// The set of services a [`SessionManager`](crate::SessionManager) talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub relationships: Arc<dyn RelationshipService>,
    pub workspaces: Arc<dyn WorkspaceService>,
    pub labs: Arc<dyn LabService>,
}

impl Collaborators {
    /// Use one backend for every service.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: AuthService + UserService + RelationshipService + WorkspaceService + LabService + 'static,
    {
        Self {
            auth: backend.clone(),
            users: backend.clone(),
            relationships: backend.clone(),
            workspaces: backend.clone(),
            labs: backend,
        }
    }
}
