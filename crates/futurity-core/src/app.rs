//! Application state container
//!
//! Wires storage, the session manager and the subject API client together.
//! The subject client reads its bearer token from the live session.

use std::sync::Arc;

use futurity_session::{BootstrapOutcome, Collaborators, Credentials, SessionManager};
use futurity_storage::Database;
use futurity_subjects::{SubjectClient, TokenSource};

use crate::config::Config;
use crate::Result;

/// Bearer tokens for the subject client, taken from the current session.
struct SessionTokens(SessionManager);

impl TokenSource for SessionTokens {
    fn bearer_token(&self) -> Option<String> {
        self.0.token()
    }
}

pub struct Futurity {
    config: Config,
    db: Database,
    session_manager: SessionManager,
    subjects: SubjectClient,
}

impl Futurity {
    /// Open the database at the configured path and build the clients.
    pub fn new(config: Config, services: Collaborators) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        Self::with_database(config, db, services)
    }

    /// Like [`Futurity::new`] but nothing survives the process.
    pub fn in_memory(config: Config, services: Collaborators) -> Result<Self> {
        let db = Database::open_in_memory()?;
        Self::with_database(config, db, services)
    }

    fn with_database(config: Config, db: Database, services: Collaborators) -> Result<Self> {
        let session_manager = SessionManager::new(db.clone(), services);
        let subjects = SubjectClient::new(
            config.endpoints.clone(),
            Arc::new(SessionTokens(session_manager.clone())),
            config.request_timeout(),
        )?;

        Ok(Self {
            config,
            db,
            session_manager,
            subjects,
        })
    }

    /// Restore the previous session, if a token was persisted.
    pub async fn initialize(&self) -> BootstrapOutcome {
        let outcome = self.session_manager.bootstrap().await;
        tracing::info!(outcome = ?outcome, "Futurity client initialized");
        outcome
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        Ok(self.session_manager.login(credentials).await?)
    }

    pub async fn logout(&self) {
        self.session_manager.logout().await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.session_manager
    }

    pub fn subjects(&self) -> &SubjectClient {
        &self.subjects
    }
}
