//! Role-based permission checks

use serde::{Deserialize, Serialize};

use crate::model::Team;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }

    fn granted_by(&self, relationships: &[String]) -> bool {
        relationships.iter().any(|r| r == self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl Session {
    pub fn is_org_admin(&self) -> bool {
        self.current_organization
            .as_ref()
            .is_some_and(|org| Role::Admin.granted_by(&org.user_relationships))
    }

    /// Check a role on the given team, or on the current team when `team_id` is `None`.
    pub fn has_team_role(&self, team_id: Option<&str>, role: Role) -> bool {
        let team: Option<&Team> = match team_id {
            Some(id) => self.find_team(id),
            None => self.current_team.as_ref(),
        };

        team.is_some_and(|t| role.granted_by(&t.user_relationships))
    }

    pub fn is_team_admin(&self, team_id: Option<&str>) -> bool {
        self.has_team_role(team_id, Role::Admin)
    }

    pub fn is_team_editor(&self, team_id: Option<&str>) -> bool {
        self.has_team_role(team_id, Role::Editor)
    }

    pub fn is_team_viewer(&self, team_id: Option<&str>) -> bool {
        self.has_team_role(team_id, Role::Viewer)
    }
}
