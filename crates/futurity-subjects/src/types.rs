//! Wire types of the subject services

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Index scores; the API wraps them in a single-element array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectIndexes {
    #[serde(rename = "HR", default, skip_serializing_if = "Option::is_none")]
    pub hr: Option<f64>,
    #[serde(rename = "TT", default, skip_serializing_if = "Option::is_none")]
    pub tt: Option<f64>,
    #[serde(rename = "WS", default, skip_serializing_if = "Option::is_none")]
    pub ws: Option<f64>,
}

impl SubjectIndexes {
    pub fn get(&self, key: IndexKey) -> Option<f64> {
        match key {
            IndexKey::Hr => self.hr,
            IndexKey::Tt => self.tt,
            IndexKey::Ws => self.ws,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKey {
    #[serde(rename = "HR")]
    Hr,
    #[serde(rename = "TT")]
    Tt,
    #[serde(rename = "WS")]
    Ws,
}

/// Readiness levels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct SubjectXrl {
    #[serde(default)]
    pub irl: f64,
    #[serde(default)]
    pub srl: f64,
    #[serde(default)]
    pub erl: f64,
    #[serde(default)]
    pub brl: f64,
    #[serde(default)]
    pub crl: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectData {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "Google_hitcounts")]
    pub google_hitcounts: u64,
    #[serde(rename = "Papers_hitcounts")]
    pub papers_hitcounts: u64,
    #[serde(rename = "Books_hitcounts")]
    pub books_hitcounts: u64,
    #[serde(rename = "Gnews_hitcounts")]
    pub gnews_hitcounts: u64,
    #[serde(rename = "Related_terms")]
    pub related_terms: String,
    pub wikipedia_definition: String,
    pub wiktionary_definition: String,
    #[serde(rename = "FST")]
    pub fst: String,
    pub wikipedia_url: String,
    pub ent_name: String,
    #[serde(rename = "FS_Cards")]
    pub fs_cards: String,
    pub subject: String,
    pub ent_fsid: String,
    pub ent_summary: String,
    pub fs_card: String,
    pub last_update: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ent_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventor: Option<String>,
    pub synonyms: Vec<String>,
    pub indexes: Vec<SubjectIndexes>,
    #[serde(rename = "xRL")]
    pub xrl: Vec<SubjectXrl>,
}

/// Unified statistics shape returned by the stats API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectStats {
    #[serde(rename = "Press", default, skip_serializing_if = "Option::is_none")]
    pub press: Option<u64>,
    #[serde(rename = "Patents", default, skip_serializing_if = "Option::is_none")]
    pub patents: Option<u64>,
    #[serde(rename = "Papers", default, skip_serializing_if = "Option::is_none")]
    pub papers: Option<u64>,
    #[serde(rename = "Books", default, skip_serializing_if = "Option::is_none")]
    pub books: Option<u64>,
    #[serde(rename = "Organizations", default, skip_serializing_if = "Option::is_none")]
    pub organizations: Option<u64>,
}

/// Response of the legacy `subject/get-counts` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyCountsResponse {
    #[serde(default)]
    pub counts: Option<LegacyCounts>,
}

/// Legacy counters use singular category names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyCounts {
    #[serde(rename = "Organization", default)]
    pub organization: Option<u64>,
    #[serde(rename = "Press", default)]
    pub press: Option<u64>,
    #[serde(rename = "Patent", default)]
    pub patent: Option<u64>,
    #[serde(rename = "Paper", default)]
    pub paper: Option<u64>,
    #[serde(rename = "Book", default)]
    pub book: Option<u64>,
}

impl From<LegacyCountsResponse> for SubjectStats {
    fn from(response: LegacyCountsResponse) -> Self {
        let counts = response.counts.unwrap_or_default();

        Self {
            organizations: Some(counts.organization.unwrap_or(0)),
            press: Some(counts.press.unwrap_or(0)),
            patents: Some(counts.patent.unwrap_or(0)),
            papers: Some(counts.paper.unwrap_or(0)),
            books: Some(counts.book.unwrap_or(0)),
        }
    }
}

/// Ridgeline (trend) chart payload. Plot data is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgelineData {
    #[serde(rename = "_generated_at")]
    pub generated_at: f64,
    pub plot_data: Vec<Value>,
    pub plot_layout: Value,
    #[serde(rename = "_generated_finish_at")]
    pub generated_finish_at: f64,
    #[serde(rename = "_generated_duration")]
    pub generated_duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkGraphData {
    #[serde(default)]
    pub nodes: Vec<Value>,
    #[serde(default)]
    pub edges: Vec<Value>,
    /// Any additional graph properties the service returns
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddToWhiteboardRequest {
    /// Subject fsid
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddToWhiteboardResponse {
    pub success: bool,
    pub message: String,
}

impl AddToWhiteboardResponse {
    /// Confirmation used when the server accepts the request without a JSON body.
    pub fn implicit_success() -> Self {
        Self {
            success: true,
            message: "Successfully added to whiteboard".to_string(),
        }
    }
}

/// Outcome of a whiteboard membership check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhiteboardMembership {
    Member,
    NotMember,
    /// The check itself failed; membership is not known.
    Unknown(String),
}

impl WhiteboardMembership {
    pub fn is_member(&self) -> bool {
        matches!(self, WhiteboardMembership::Member)
    }
}
