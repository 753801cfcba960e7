//! In-memory collaborator backend for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use tokio::sync::watch;

use crate::model::{
    Credentials, ExtendedProfile, Lab, LoginResponse, Organization, Relationships, Team,
    Teamspace, User, WhiteboardRef, Workspace, WorkspaceSummary,
};
use crate::service::{
    AuthService, LabService, RelationshipService, ServiceError, ServiceResult, UserService,
    WorkspaceService,
};
use crate::session::Session;

pub fn team(id: &str, unique_id: &str, name: &str, roles: &[&str]) -> Team {
    Team::new(id, unique_id, name).with_roles(roles)
}

pub fn lab(id: &str) -> Lab {
    Lab {
        id: id.to_string(),
        unique_id: None,
        ent_name: None,
        status: None,
        extra: Map::new(),
    }
}

fn teamspace(id: &str) -> Teamspace {
    Teamspace {
        id: id.to_string(),
        name: None,
        extra: Map::new(),
    }
}

/// Serves one user with two teams, one organization and one workspace.
/// Individual calls can be made to fail.
pub struct FakeBackend {
    rotated_key: Option<String>,
    verify_error: Option<ServiceError>,
    login_error: Option<ServiceError>,
    logout_error: Option<ServiceError>,
    extended: ServiceResult<ExtendedProfile>,
    whiteboard_error: Option<ServiceError>,
    relationships: Mutex<ServiceResult<Relationships>>,
    labs_error: Mutex<Option<ServiceError>>,
    calls: Mutex<Vec<String>>,
    /// Session changes, sampled when the extended profile is requested
    observer: Mutex<Option<watch::Receiver<Session>>>,
    seen_at_extended: Mutex<Option<Session>>,
}

impl FakeBackend {
    pub const TOKEN: &'static str = "token-1";

    pub fn new() -> Self {
        let organization = Organization {
            id: "org-1".to_string(),
            unique_id: "org-unique-1".to_string(),
            ent_name: "Futurity".to_string(),
            user_relationships: vec!["admin".to_string()],
            extra: Map::new(),
        };

        Self {
            rotated_key: None,
            verify_error: None,
            login_error: None,
            logout_error: None,
            extended: Ok(json_object(json!({ "first_name": "Ada" }))),
            whiteboard_error: None,
            relationships: Mutex::new(Ok(Relationships {
                organizations: vec![organization],
                teams: vec![
                    team("a", "team-1", "Research", &["admin"]),
                    team("b", "team-2", "Strategy", &["viewer"]),
                ],
            })),
            labs_error: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            observer: Mutex::new(None),
            seen_at_extended: Mutex::new(None),
        }
    }

    pub fn with_rotated_key(mut self, key: &str) -> Self {
        self.rotated_key = Some(key.to_string());
        self
    }

    pub fn with_verify_error(mut self, error: ServiceError) -> Self {
        self.verify_error = Some(error);
        self
    }

    pub fn with_login_error(mut self, error: ServiceError) -> Self {
        self.login_error = Some(error);
        self
    }

    pub fn with_logout_error(mut self, error: ServiceError) -> Self {
        self.logout_error = Some(error);
        self
    }

    pub fn with_extended(mut self, extended: Value) -> Self {
        self.extended = Ok(json_object(extended));
        self
    }

    pub fn with_extended_error(mut self, error: ServiceError) -> Self {
        self.extended = Err(error);
        self
    }

    pub fn with_whiteboard_error(mut self, error: ServiceError) -> Self {
        self.whiteboard_error = Some(error);
        self
    }

    pub fn with_relationships_error(self, error: ServiceError) -> Self {
        self.fail_relationships(error);
        self
    }

    pub fn with_teams(self, teams: Vec<Team>) -> Self {
        self.set_teams(teams);
        self
    }

    pub fn set_teams(&self, teams: Vec<Team>) {
        let mut relationships = self.relationships.lock();
        let organizations = relationships
            .as_ref()
            .map(|r| r.organizations.clone())
            .unwrap_or_default();
        *relationships = Ok(Relationships {
            organizations,
            teams,
        });
    }

    pub fn fail_relationships(&self, error: ServiceError) {
        *self.relationships.lock() = Err(error);
    }

    pub fn fail_labs(&self, error: ServiceError) {
        *self.labs_error.lock() = Some(error);
    }

    pub fn observe(&self, changes: watch::Receiver<Session>) {
        *self.observer.lock() = Some(changes);
    }

    /// The session as it was when the extended profile was requested.
    pub fn seen_at_extended(&self) -> Option<Session> {
        self.seen_at_extended.lock().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    fn user(&self) -> User {
        let mut user = User::new("user-1");
        user.email = Some("ada@example.com".to_string());
        user.auth_key = Some(
            self.rotated_key
                .clone()
                .unwrap_or_else(|| Self::TOKEN.to_string()),
        );
        user
    }
}

fn json_object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[async_trait]
impl AuthService for FakeBackend {
    async fn verify_token(&self, token: &str) -> ServiceResult<User> {
        self.record("verify_token");
        if let Some(e) = &self.verify_error {
            return Err(e.clone());
        }
        if token != Self::TOKEN && Some(token) != self.rotated_key.as_deref() {
            return Err(ServiceError::Unauthorized("unknown token".to_string()));
        }
        Ok(self.user())
    }

    async fn login(&self, _credentials: &Credentials) -> ServiceResult<LoginResponse> {
        self.record("login");
        if let Some(e) = &self.login_error {
            return Err(e.clone());
        }
        let mut user = self.user();
        user.auth_key = Some(Self::TOKEN.to_string());
        Ok(LoginResponse {
            token: Self::TOKEN.to_string(),
            user,
        })
    }

    async fn logout(&self, _token: Option<&str>) -> ServiceResult<()> {
        self.record("logout");
        match &self.logout_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserService for FakeBackend {
    async fn get_extended_user_data(
        &self,
        _user_id: &str,
        _token: &str,
    ) -> ServiceResult<ExtendedProfile> {
        self.record("get_extended_user_data");
        if let Some(changes) = self.observer.lock().as_ref() {
            *self.seen_at_extended.lock() = Some(changes.borrow().clone());
        }
        self.extended.clone()
    }

    async fn get_user_whiteboard(
        &self,
        _user_id: &str,
        _token: &str,
    ) -> ServiceResult<WhiteboardRef> {
        self.record("get_user_whiteboard");
        match &self.whiteboard_error {
            Some(e) => Err(e.clone()),
            None => Ok(WhiteboardRef {
                unique_id: "wb-1".to_string(),
            }),
        }
    }

    async fn get_user_workspaces(&self, _token: &str) -> ServiceResult<Vec<WorkspaceSummary>> {
        self.record("get_user_workspaces");
        Ok(vec![WorkspaceSummary {
            id: "ws-1".to_string(),
            extra: Map::new(),
        }])
    }
}

#[async_trait]
impl RelationshipService for FakeBackend {
    async fn get_user_relationships(
        &self,
        _user_id: &str,
        _token: &str,
    ) -> ServiceResult<Relationships> {
        self.record("get_user_relationships");
        self.relationships.lock().clone()
    }
}

#[async_trait]
impl WorkspaceService for FakeBackend {
    async fn get_workspace(&self, workspace_id: &str, _token: &str) -> ServiceResult<Workspace> {
        self.record(format!("get_workspace:{workspace_id}"));
        Ok(Workspace {
            id: workspace_id.to_string(),
            name: Some("Main".to_string()),
            teamspaces_details: vec![teamspace("ts-1"), teamspace("ts-2")],
            extra: Map::new(),
        })
    }
}

#[async_trait]
impl LabService for FakeBackend {
    async fn get_labs_for_team(
        &self,
        team_id: &str,
        _token: &str,
        _include_archived: bool,
    ) -> ServiceResult<Vec<Lab>> {
        self.record(format!("get_labs_for_team:{team_id}"));
        if let Some(e) = self.labs_error.lock().clone() {
            return Err(e);
        }
        let labs = match team_id {
            "team-1" => vec![lab("lab-1")],
            "team-2" => vec![lab("lab-2")],
            _ => Vec::new(),
        };
        Ok(labs)
    }
}
