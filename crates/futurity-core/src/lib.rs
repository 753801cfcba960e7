//! Futurity Core
//!
//! Composition root of the Futurity client: configuration, logging and the
//! [`Futurity`] container that ties storage, the session and the subject API
//! client together.

mod app;
mod config;
mod error;

pub use app::Futurity;
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use futurity_session::{
    BootstrapOutcome, Collaborators, Credentials, Role, ServiceError, Session, SessionError,
    SessionManager, SessionPhase, Team, Teamspace, User,
};
pub use futurity_storage::{Database, StorageError};
pub use futurity_subjects::{
    ApiEndpoints, SubjectClient, SubjectData, SubjectError, SubjectStats, WhiteboardMembership,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging. `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt().with_env_filter(filter).with_target(true).init();
}
