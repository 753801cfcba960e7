//! Session Manager
//!
//! Owns the one live [`Session`] of the process and every transition of it.
//! Callers read snapshots or subscribe to changes; only the manager mutates.
//!
//! Operations are not serialized against each other. Two overlapping calls
//! (say, two `set_current_team`) both run to completion and the last write to
//! a field wins.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;

use futurity_storage::Database;

use crate::model::{Credentials, ExtendedProfile, Lab, Relationships, Team, Teamspace, User, Workspace};
use crate::reconcile::{reconcile, TeamSelection};
use crate::service::{Collaborators, ServiceError, ServiceResult};
use crate::session::{Session, SessionPhase};
use crate::store::{ClientStore, StoredSelection};
use crate::Result;

/// How [`SessionManager::bootstrap`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    /// No token was persisted; the session stays empty
    NoStoredToken,
    /// The persisted token was accepted and the session populated
    Restored,
    /// The token was rejected (401/403); session and persisted token cleared
    Rejected(ServiceError),
    /// Verification failed for another reason; the token is kept for a retry
    Unverified(ServiceError),
}

pub struct SessionManager {
    /// Live session
    state: Arc<RwLock<Session>>,
    /// Publishes a snapshot after every mutation
    changes: Arc<watch::Sender<Session>>,
    /// Durable token and team selection
    store: ClientStore,
    services: Collaborators,
}

impl SessionManager {
    pub fn new(db: Database, services: Collaborators) -> Self {
        let (changes, _) = watch::channel(Session::new());

        Self {
            state: Arc::new(RwLock::new(Session::new())),
            changes: Arc::new(changes),
            store: ClientStore::new(db),
            services,
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.read().clone()
    }

    /// Receive a snapshot after each change of the session.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.changes.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Session),
    {
        let mut session = self.state.write();
        f(&mut session);
        // Sent before the lock is released, so snapshots go out in write order
        self.changes.send_replace(session.clone());
    }

    /// User and token of the active session, if there is one.
    fn credentials(&self) -> Option<(User, String)> {
        let session = self.state.read();
        match (&session.user, &session.token) {
            (Some(user), Some(token)) => Some((user.clone(), token.clone())),
            _ => None,
        }
    }

    /// Restore the session from a persisted token.
    pub async fn bootstrap(&self) -> BootstrapOutcome {
        self.update(|s| {
            s.phase = SessionPhase::Bootstrapping;
            s.is_loading = true;
            s.is_loading_user = true;
        });

        let stored_token = match self.store.load_token() {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read persisted token");
                None
            }
        };

        let Some(stored_token) = stored_token else {
            self.update(|s| {
                s.phase = SessionPhase::Empty;
                s.is_loading = false;
                s.is_loading_user = false;
            });
            return BootstrapOutcome::NoStoredToken;
        };

        self.update(|s| s.token = Some(stored_token.clone()));

        let user = match self.services.auth.verify_token(&stored_token).await {
            Ok(user) => user,
            Err(e) if e.is_auth_failure() => {
                tracing::info!(error = %e, "Persisted token rejected, clearing session");
                self.forget_token();
                self.update(|s| *s = Session::cleared());
                return BootstrapOutcome::Rejected(e);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to verify persisted token, keeping it for retry");
                self.update(|s| {
                    s.phase = SessionPhase::Empty;
                    s.token = Some(stored_token.clone());
                    s.is_loading = false;
                    s.is_loading_user = false;
                });
                return BootstrapOutcome::Unverified(e);
            }
        };

        let token = self.adopt_rotated_token(&user, stored_token);

        self.update(|s| {
            s.user = Some(user.clone());
            s.token = Some(token.clone());
            s.is_loading_user = false;
        });

        self.load_session_data(&user, &token).await;

        self.update(|s| {
            s.phase = SessionPhase::Populated;
            s.is_loading = false;
        });

        tracing::info!(user_id = %user.id, "Restored session");

        BootstrapOutcome::Restored
    }

    /// Authenticate and load the new user's data.
    ///
    /// Only authentication failures are returned; failures while loading the
    /// user's data leave the affected fields empty.
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.update(|s| {
            s.phase = SessionPhase::Authenticating;
            s.is_loading = true;
            s.is_loading_user = true;
        });

        let response = match self.services.auth.login(credentials).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(email = %credentials.email, error = %e, "Login failed");
                self.update(|s| {
                    s.phase = if s.user.is_some() {
                        SessionPhase::Populated
                    } else {
                        SessionPhase::Empty
                    };
                    s.is_loading = false;
                    s.is_loading_user = false;
                });
                return Err(e.into());
            }
        };

        let user = response.user;
        let token = response.token;

        self.persist_token(&token);
        self.update(|s| {
            *s = Session {
                phase: SessionPhase::Authenticating,
                user: Some(user.clone()),
                token: Some(token.clone()),
                is_loading: true,
                ..Session::default()
            };
        });

        self.load_session_data(&user, &token).await;

        self.update(|s| {
            s.phase = SessionPhase::Populated;
            s.is_loading = false;
        });

        tracing::info!(user_id = %user.id, "Logged in");

        Ok(())
    }

    /// Sign out. Local state is cleared even when the remote logout fails.
    pub async fn logout(&self) {
        let token = self.token();
        self.update(|s| {
            s.is_loading = true;
            s.is_loading_user = true;
        });

        if let Err(e) = self.services.auth.logout(token.as_deref()).await {
            tracing::warn!(error = %e, "Remote logout failed, clearing local session anyway");
        }

        self.forget_team();
        self.forget_token();
        self.update(|s| *s = Session::cleared());

        tracing::info!("Logged out");
    }

    /// Switch the current team, persist the choice and reload its labs.
    pub async fn set_current_team(&self, team: Option<Team>) {
        tracing::info!(
            team = team.as_ref().map(|t| t.ent_name.as_str()).unwrap_or("none"),
            "Setting current team"
        );

        self.update(|s| s.current_team = team.clone());

        match &team {
            Some(t) => self.persist_team(t),
            None => self.forget_team(),
        }

        match (team, self.token()) {
            (Some(team), Some(token)) => self.load_labs(&team, &token).await,
            _ => self.update(|s| s.current_team_labs.clear()),
        }
    }

    pub fn set_current_teamspace(&self, teamspace: Option<Teamspace>) {
        self.update(|s| s.current_teamspace = teamspace);
    }

    // --- Refresh ---------------------------------------------------------
    //
    // Each refresh re-fetches one part of the session. Without an active
    // session it does nothing; on failure the error is returned and the
    // session is left as it was.

    pub async fn refresh_user(&self) -> Result<()> {
        let Some((_, token)) = self.credentials() else {
            return Ok(());
        };

        let basic = self.services.auth.verify_token(&token).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to refresh user data");
            e
        })?;
        let (merged, extended) = self.fetch_extended_user(&basic, &token).await?;
        let token = self.adopt_rotated_token(&basic, token);

        self.update(|s| {
            s.user = Some(merged);
            s.extended_user = Some(extended);
            s.token = Some(token);
        });
        Ok(())
    }

    /// The auth service may hand back a rotated token as `auth_key`. A new
    /// one is persisted and returned in place of `current`.
    fn adopt_rotated_token(&self, user: &User, current: String) -> String {
        match user.auth_key.as_deref() {
            Some(rotated) if rotated != current => {
                tracing::info!(user_id = %user.id, "Adopting rotated auth token");
                self.persist_token(rotated);
                rotated.to_string()
            }
            _ => current,
        }
    }

    pub async fn refresh_whiteboard(&self) -> Result<()> {
        let Some((user, token)) = self.credentials() else {
            return Ok(());
        };

        let whiteboard_id = self.fetch_whiteboard(&user, &token).await?;
        self.update(|s| s.whiteboard_id = Some(whiteboard_id));
        Ok(())
    }

    pub async fn refresh_relationships(&self) -> Result<()> {
        let Some((user, token)) = self.credentials() else {
            return Ok(());
        };

        let relationships = self.fetch_relationships(&user, &token).await?;
        self.apply_relationships(relationships, &token).await;
        Ok(())
    }

    pub async fn refresh_workspace(&self) -> Result<()> {
        let Some((_, token)) = self.credentials() else {
            return Ok(());
        };

        let workspace = self.fetch_workspace(&token).await?;
        self.apply_workspace(workspace);
        Ok(())
    }

    /// Reload labs of the current team. Without a current team the labs are cleared.
    pub async fn refresh_labs(&self) -> Result<()> {
        let (team, token) = {
            let session = self.state.read();
            (session.current_team.clone(), session.token.clone())
        };

        let (Some(team), Some(token)) = (team, token) else {
            self.update(|s| s.current_team_labs.clear());
            return Ok(());
        };

        let labs = self.fetch_labs(&team, &token).await?;
        self.update(|s| s.current_team_labs = labs);
        Ok(())
    }

    // --- Enrichment ------------------------------------------------------

    /// Load everything that hangs off an authenticated user. Steps run in
    /// order and a failing step never stops the ones after it.
    async fn load_session_data(&self, user: &User, token: &str) {
        self.load_extended_user(user, token).await;
        self.load_whiteboard(user, token).await;
        self.load_relationships(user, token).await;
        self.load_workspace(token).await;
    }

    async fn load_extended_user(&self, user: &User, token: &str) {
        match self.fetch_extended_user(user, token).await {
            Ok((merged, extended)) => {
                self.update(|s| {
                    s.user = Some(merged);
                    s.extended_user = Some(extended);
                });
                tracing::debug!(user_id = %user.id, "Loaded extended user data");
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user.id,
                    error = %e,
                    "Failed to load extended user data, using basic user data"
                );
                self.update(|s| s.extended_user = None);
            }
        }
    }

    async fn fetch_extended_user(
        &self,
        basic: &User,
        token: &str,
    ) -> Result<(User, ExtendedProfile)> {
        let extended = self
            .services
            .users
            .get_extended_user_data(&basic.id, token)
            .await?;
        let merged = basic.merge_extended(&extended);
        Ok((merged, extended))
    }

    async fn load_whiteboard(&self, user: &User, token: &str) {
        match self.fetch_whiteboard(user, token).await {
            Ok(whiteboard_id) => {
                tracing::debug!(whiteboard_id = %whiteboard_id, "Loaded whiteboard");
                self.update(|s| s.whiteboard_id = Some(whiteboard_id));
            }
            Err(e) => {
                if matches!(e, crate::SessionError::Service(ServiceError::NotFound(_))) {
                    tracing::info!(user_id = %user.id, "No whiteboard for user");
                } else {
                    tracing::warn!(user_id = %user.id, error = %e, "Failed to load whiteboard");
                }
                self.update(|s| s.whiteboard_id = None);
            }
        }
    }

    async fn fetch_whiteboard(&self, user: &User, token: &str) -> Result<String> {
        let whiteboard = self
            .services
            .users
            .get_user_whiteboard(&user.id, token)
            .await?;
        Ok(whiteboard.unique_id)
    }

    async fn load_relationships(&self, user: &User, token: &str) {
        match self.fetch_relationships(user, token).await {
            Ok(relationships) => self.apply_relationships(relationships, token).await,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to load relationships");
                self.update(|s| {
                    s.relationships = None;
                    s.current_team = None;
                    s.current_organization = None;
                    s.current_team_labs.clear();
                });
            }
        }
    }

    async fn fetch_relationships(&self, user: &User, token: &str) -> Result<Relationships> {
        Ok(self
            .services
            .relationships
            .get_user_relationships(&user.id, token)
            .await?)
    }

    async fn apply_relationships(&self, relationships: Relationships, token: &str) {
        let teams = relationships.teams.clone();

        tracing::debug!(
            organizations = relationships.organizations.len(),
            teams = teams.len(),
            "Loaded relationships"
        );

        self.update(|s| {
            s.current_organization = relationships.organizations.first().cloned();
            s.relationships = Some(relationships);
        });

        self.select_team(&teams, token).await;
    }

    /// Reconcile the persisted team with the teams the user has now.
    async fn select_team(&self, available: &[Team], token: &str) {
        let persisted = match self.store.load_team() {
            StoredSelection::Unreadable(reason) => {
                tracing::warn!(reason = %reason, "Ignoring unreadable persisted team");
                None
            }
            other => other.into_team(),
        };

        let selection = reconcile(available, persisted.as_ref());
        match &selection {
            TeamSelection::NoTeams => tracing::info!("No teams available for user"),
            TeamSelection::Restored(team) => {
                tracing::info!(team = %team.ent_name, "Restored persisted team")
            }
            TeamSelection::Revoked { stale, fallback } => {
                tracing::info!(
                    stale = %stale.ent_name,
                    team = %fallback.ent_name,
                    "Persisted team no longer accessible, using first available team"
                );
                self.forget_team();
            }
            TeamSelection::FirstAvailable(team) => {
                tracing::info!(team = %team.ent_name, "No persisted team, using first available team")
            }
        }

        let Some(team) = selection.into_team() else {
            self.update(|s| {
                s.current_team = None;
                s.current_team_labs.clear();
            });
            return;
        };

        self.update(|s| s.current_team = Some(team.clone()));
        self.persist_team(&team);
        self.load_labs(&team, token).await;
    }

    async fn load_workspace(&self, token: &str) {
        match self.fetch_workspace(token).await {
            Ok(workspace) => self.apply_workspace(workspace),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load workspace");
                self.apply_workspace(None);
            }
        }
    }

    /// The first workspace the user can access, with its teamspaces.
    async fn fetch_workspace(&self, token: &str) -> Result<Option<Workspace>> {
        let workspaces = self.services.users.get_user_workspaces(token).await?;

        let Some(first) = workspaces.first() else {
            tracing::warn!("User has no workspaces available");
            return Ok(None);
        };

        let workspace = self.services.workspaces.get_workspace(&first.id, token).await?;
        Ok(Some(workspace))
    }

    fn apply_workspace(&self, workspace: Option<Workspace>) {
        self.update(|s| {
            s.teamspaces = workspace
                .as_ref()
                .map(|w| w.teamspaces_details.clone())
                .unwrap_or_default();
            s.current_teamspace = s.teamspaces.first().cloned();
            s.workspace = workspace;
        });
    }

    async fn load_labs(&self, team: &Team, token: &str) {
        match self.fetch_labs(team, token).await {
            Ok(labs) => {
                tracing::debug!(team = %team.ent_name, count = labs.len(), "Loaded labs");
                self.update(|s| s.current_team_labs = labs);
            }
            Err(e) => {
                tracing::warn!(team = %team.ent_name, error = %e, "Failed to load labs");
                self.update(|s| s.current_team_labs.clear());
            }
        }
    }

    async fn fetch_labs(&self, team: &Team, token: &str) -> ServiceResult<Vec<Lab>> {
        self.update(|s| s.is_loading_labs = true);
        let result = self
            .services
            .labs
            .get_labs_for_team(&team.unique_id, token, false)
            .await;
        self.update(|s| s.is_loading_labs = false);
        result
    }

    // --- Persistence -----------------------------------------------------
    //
    // Storage failures are logged and never fail a session operation.

    fn persist_token(&self, token: &str) {
        if let Err(e) = self.store.save_token(token) {
            tracing::error!(error = %e, "Failed to persist auth token");
        }
    }

    fn forget_token(&self) {
        if let Err(e) = self.store.clear_token() {
            tracing::error!(error = %e, "Failed to remove persisted auth token");
        }
    }

    fn persist_team(&self, team: &Team) {
        match self.store.save_team(team) {
            Ok(()) => tracing::debug!(team = %team.ent_name, "Persisted current team"),
            Err(e) => tracing::error!(error = %e, "Failed to persist current team"),
        }
    }

    fn forget_team(&self) {
        if let Err(e) = self.store.clear_team() {
            tracing::error!(error = %e, "Failed to remove persisted team");
        }
    }
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            changes: Arc::clone(&self.changes),
            store: self.store.clone(),
            services: self.services.clone(),
        }
    }
}
