//! Durable client state: the bearer token and the current team selection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use futurity_storage::{Database, StorageError, AUTH_TOKEN_KEY, CURRENT_TEAM_KEY};

use crate::model::Team;

/// Reduced projection of a [`Team`] kept across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTeam {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "uniqueID")]
    pub unique_id: String,
    pub ent_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ent_fsid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_relationships: Vec<String>,
}

impl From<&Team> for PersistedTeam {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id.clone(),
            unique_id: team.unique_id.clone(),
            ent_name: team.ent_name.clone(),
            ent_fsid: team.ent_fsid.clone(),
            metadata: team.metadata.clone(),
            status: team.status.clone(),
            created_at: team.created_at,
            updated_at: team.updated_at,
            user_relationships: team.user_relationships.clone(),
        }
    }
}

/// What the store holds for the current team.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredSelection {
    Absent,
    Present(PersistedTeam),
    /// Something is stored but could not be read back
    Unreadable(String),
}

impl StoredSelection {
    /// Unreadable selections count as no selection.
    pub fn into_team(self) -> Option<PersistedTeam> {
        match self {
            StoredSelection::Present(team) => Some(team),
            StoredSelection::Absent | StoredSelection::Unreadable(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct ClientStore {
    db: Database,
}

impl ClientStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn load_token(&self) -> Result<Option<String>, StorageError> {
        self.db.get_value(AUTH_TOKEN_KEY)
    }

    pub fn save_token(&self, token: &str) -> Result<(), StorageError> {
        self.db.set_value(AUTH_TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.db.remove_value(AUTH_TOKEN_KEY)
    }

    pub fn load_team(&self) -> StoredSelection {
        match self.db.get_json::<PersistedTeam>(CURRENT_TEAM_KEY) {
            Ok(Some(team)) => StoredSelection::Present(team),
            Ok(None) => StoredSelection::Absent,
            Err(e) => StoredSelection::Unreadable(e.to_string()),
        }
    }

    pub fn save_team(&self, team: &Team) -> Result<(), StorageError> {
        self.db.set_json(CURRENT_TEAM_KEY, &PersistedTeam::from(team))
    }

    pub fn clear_team(&self) -> Result<(), StorageError> {
        self.db.remove_value(CURRENT_TEAM_KEY)
    }
}
