//! Session snapshot

use serde::Serialize;

use crate::model::{ExtendedProfile, Lab, Organization, Relationships, Team, Teamspace, User, Workspace};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// No user; a persisted token may still be held for a retry
    #[default]
    Empty,
    /// Verifying a persisted token and loading its data
    Bootstrapping,
    /// Logging in with credentials
    Authenticating,
    /// A user is signed in
    Populated,
    /// Signed out, or the persisted token was rejected
    Cleared,
}

/// Everything known about the signed-in user.
///
/// Handed out by value; the live copy is owned by the
/// [`SessionManager`](crate::SessionManager).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub phase: SessionPhase,
    pub user: Option<User>,
    pub extended_user: Option<ExtendedProfile>,
    pub token: Option<String>,
    pub workspace: Option<Workspace>,
    pub teamspaces: Vec<Teamspace>,
    pub current_teamspace: Option<Teamspace>,
    pub relationships: Option<Relationships>,
    pub current_team: Option<Team>,
    pub current_organization: Option<Organization>,
    pub whiteboard_id: Option<String>,
    pub current_team_labs: Vec<Lab>,
    pub is_loading: bool,
    /// Cleared as soon as the basic user record is known, before enrichment
    pub is_loading_user: bool,
    pub is_loading_labs: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn cleared() -> Self {
        Self {
            phase: SessionPhase::Cleared,
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Look up one of the user's teams by `_id` or `uniqueID`.
    pub fn find_team(&self, team_id: &str) -> Option<&Team> {
        self.relationships
            .as_ref()?
            .teams
            .iter()
            .find(|t| t.matches_id(team_id))
    }

    pub fn team_count(&self) -> usize {
        self.relationships.as_ref().map_or(0, |r| r.teams.len())
    }
}
