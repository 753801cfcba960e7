//! Futurity Subject API
//!
//! Stateless wrappers around the remote subject services:
//! - management API: subject lookup, whiteboard membership
//! - graphs API: ridgeline trend data, network graph data
//! - stats API, with a fallback to the legacy slug-based counts API
//!
//! Also home to the pure identifier (`fsid`) and display helpers used by views.

mod client;
mod endpoints;
mod error;
pub mod format;
pub mod fsid;
mod types;

pub use client::{SubjectClient, TokenSource, DEFAULT_GRAPH_LIMIT};
pub use endpoints::ApiEndpoints;
pub use error::SubjectError;
pub use types::{
    AddToWhiteboardRequest, AddToWhiteboardResponse, IndexKey, LegacyCounts,
    LegacyCountsResponse, NetworkGraphData, RidgelineData, SubjectData, SubjectIndexes,
    SubjectStats, SubjectXrl, WhiteboardMembership,
};

pub type Result<T> = std::result::Result<T, SubjectError>;
