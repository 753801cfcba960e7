//! Futurity Session Management
//!
//! Owns the authenticated session of the running client:
//! - bootstrap from a persisted token, login, logout
//! - enrichment with extended profile, whiteboard, memberships, workspace and labs
//! - current team selection, persisted across restarts and reconciled on reload
//! - role-based permission checks
//!
//! Remote collaborators (auth, users, relationships, workspaces, labs) are
//! reached through the traits in [`service`], so any transport can back them.

mod error;
mod manager;
mod model;
mod permissions;
mod reconcile;
pub mod service;
mod session;
mod store;

#[cfg(test)]
mod testing;

pub use error::SessionError;
pub use manager::{BootstrapOutcome, SessionManager};
pub use model::{
    Credentials, ExtendedProfile, Lab, LoginResponse, Organization, Relationships, Team,
    Teamspace, User, WhiteboardRef, Workspace, WorkspaceSummary,
};
pub use permissions::Role;
pub use reconcile::{reconcile, TeamSelection};
pub use service::{Collaborators, ServiceError};
pub use session::{Session, SessionPhase};
pub use store::{ClientStore, PersistedTeam, StoredSelection};

pub type Result<T> = std::result::Result<T, SessionError>;
