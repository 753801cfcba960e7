//! Records exchanged with the auth, user, relationship, workspace and lab services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Extended profile as returned by the user service. Its shape is owned by
/// that service, so it is kept as raw JSON.
pub type ExtendedProfile = Map<String, Value>;

/// Fields that identify and authenticate the user. Never taken from the
/// extended profile.
const PROTECTED_USER_FIELDS: [&str; 3] = ["_id", "auth_key", "guid"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Remaining profile attributes
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            auth_key: None,
            guid: None,
            email: None,
            username: None,
            profile: Map::new(),
        }
    }

    /// Overlay the extended profile on this user.
    ///
    /// `_id`, `auth_key` and `guid` always keep the values of `self`, whatever
    /// the extended profile contains. An extended `email` or `username` that is
    /// not a string keeps the basic value; every other field is still merged.
    pub fn merge_extended(&self, extended: &ExtendedProfile) -> User {
        let mut merged = self.clone();

        for (key, value) in extended {
            match key.as_str() {
                k if PROTECTED_USER_FIELDS.contains(&k) => {}
                "email" => merge_text_field(&mut merged.email, key, value),
                "username" => merge_text_field(&mut merged.username, key, value),
                _ => {
                    merged.profile.insert(key.clone(), value.clone());
                }
            }
        }

        merged
    }
}

fn merge_text_field(field: &mut Option<String>, key: &str, value: &Value) {
    match value {
        Value::String(text) => *field = Some(text.clone()),
        Value::Null => *field = None,
        _ => tracing::warn!(field = %key, "Ignoring extended profile field of unexpected type"),
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
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
    /// Role strings (`admin`, `editor`, `viewer`) of the user in this team
    #[serde(default)]
    pub user_relationships: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Team {
    pub fn new(
        id: impl Into<String>,
        unique_id: impl Into<String>,
        ent_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            unique_id: unique_id.into(),
            ent_name: ent_name.into(),
            ent_fsid: None,
            metadata: None,
            status: None,
            created_at: None,
            updated_at: None,
            user_relationships: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.user_relationships = roles.iter().map(|r| r.to_string()).collect();
        self
    }

    /// Teams are addressed by either identifier.
    pub fn matches_id(&self, id: &str) -> bool {
        self.unique_id == id || self.id == id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "uniqueID", default)]
    pub unique_id: String,
    #[serde(default)]
    pub ent_name: String,
    #[serde(default)]
    pub user_relationships: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationships {
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

/// Entry of the user's workspace list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub teamspaces_details: Vec<Teamspace>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teamspace {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "uniqueID", default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The user's whiteboard, identified by its `uniqueID`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhiteboardRef {
    #[serde(rename = "uniqueID")]
    pub unique_id: String,
}
