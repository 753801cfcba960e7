//! Base URLs of the remote services

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEndpoints {
    /// Stats API (`/hitcounts/...`)
    pub api_base: Url,
    /// Subject lookup and whiteboards
    pub management_base: Url,
    /// Ridgeline and network graph data
    pub graphs_base: Url,
    /// Slug-based counts API used when the stats API fails
    pub legacy_base: Url,
}

impl ApiEndpoints {
    /// Derive every endpoint from a single root, the way the production
    /// deployment nests `management` and `graphs` under the API host.
    /// The legacy API is mounted at `<root>/legacy`.
    pub fn from_root(root: &Url) -> Result<Self, url::ParseError> {
        let root = root.as_str().trim_end_matches('/');

        Ok(Self {
            api_base: Url::parse(root)?,
            management_base: Url::parse(&format!("{root}/management"))?,
            graphs_base: Url::parse(&format!("{root}/graphs"))?,
            legacy_base: Url::parse(&format!("{root}/legacy"))?,
        })
    }

    pub(crate) fn api(&self, path: &str) -> String {
        join(&self.api_base, path)
    }

    pub(crate) fn management(&self, path: &str) -> String {
        join(&self.management_base, path)
    }

    pub(crate) fn graphs(&self, path: &str) -> String {
        join(&self.graphs_base, path)
    }

    pub(crate) fn legacy(&self, path: &str) -> String {
        join(&self.legacy_base, path)
    }
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            api_base: Url::parse("https://fast.futurity.science").expect("valid default URL"),
            management_base: Url::parse("https://fast.futurity.science/management")
                .expect("valid default URL"),
            graphs_base: Url::parse("https://fast.futurity.science/graphs")
                .expect("valid default URL"),
            legacy_base: Url::parse("https://tools.futurity.science/api")
                .expect("valid default URL"),
        }
    }
}

fn join(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
