//! Subject API client

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::endpoints::ApiEndpoints;
use crate::error::SubjectError;
use crate::fsid::slug_from_fsid;
use crate::types::{
    AddToWhiteboardRequest, AddToWhiteboardResponse, LegacyCountsResponse, NetworkGraphData,
    RidgelineData, SubjectData, SubjectStats, WhiteboardMembership,
};
use crate::Result;

pub const DEFAULT_GRAPH_LIMIT: u32 = 1000;

/// Supplies the bearer token attached to every request.
///
/// Looked up per request, so a token obtained after the client was built
/// (login, rotation) is picked up without rebuilding the client.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

impl<F> TokenSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn bearer_token(&self) -> Option<String> {
        self()
    }
}

#[derive(Clone)]
pub struct SubjectClient {
    http: reqwest::Client,
    endpoints: ApiEndpoints,
    tokens: Arc<dyn TokenSource>,
}

impl SubjectClient {
    pub fn new(
        endpoints: ApiEndpoints,
        tokens: Arc<dyn TokenSource>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoints,
            tokens,
        })
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn get(&self, url: String) -> RequestBuilder {
        self.authorized(self.http.get(url))
    }

    /// Look up a subject by fsid.
    pub async fn fetch_subject(&self, fsid: &str) -> Result<SubjectData> {
        tracing::debug!(fsid = %fsid, "Fetching subject data");

        let response = self
            .get(self.endpoints.management(&format!("subjects/{fsid}")))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let data = response.json::<SubjectData>().await?;
                tracing::debug!(fsid = %fsid, "Fetched subject data");
                Ok(data)
            }
            StatusCode::NOT_FOUND => Err(SubjectError::NotFound(fsid.to_string())),
            StatusCode::UNAUTHORIZED => Err(SubjectError::AuthRequired),
            status => {
                tracing::error!(fsid = %fsid, %status, "Subject lookup failed");
                Err(SubjectError::Status {
                    action: "fetch subject data",
                    status,
                })
            }
        }
    }

    /// Fetch statistics, falling back to the legacy counts API.
    ///
    /// When both APIs fail the error of the primary API is returned.
    pub async fn fetch_stats(&self, fsid: &str) -> Result<SubjectStats> {
        let primary_err = match self.fetch_primary_stats(fsid).await {
            Ok(stats) => return Ok(stats),
            Err(e) => e,
        };

        tracing::warn!(
            fsid = %fsid,
            error = %primary_err,
            "Stats API failed, trying legacy API"
        );

        match self.fetch_legacy_stats(fsid).await {
            Ok(stats) => Ok(stats),
            Err(legacy_err) => {
                tracing::error!(fsid = %fsid, error = %legacy_err, "Legacy stats API also failed");
                Err(primary_err)
            }
        }
    }

    async fn fetch_primary_stats(&self, fsid: &str) -> Result<SubjectStats> {
        let url = self
            .endpoints
            .api(&format!("hitcounts/get-subject-stats/{fsid}"));
        self.get_json(self.get(url), "fetch subject stats").await
    }

    async fn fetch_legacy_stats(&self, fsid: &str) -> Result<SubjectStats> {
        let slug = slug_from_fsid(fsid);
        let request = self
            .get(self.endpoints.legacy("subject/get-counts"))
            .query(&[("slug", slug)]);

        let response: LegacyCountsResponse =
            self.get_json(request, "fetch legacy subject stats").await?;
        Ok(response.into())
    }

    /// Ridgeline data for the trend chart.
    pub async fn fetch_trend_data(&self, fsid: &str) -> Result<RidgelineData> {
        let request = self
            .get(self.endpoints.graphs("ridgeline-data"))
            .query(&[("subject", fsid)]);
        self.get_json(request, "fetch ridgeline data").await
    }

    pub async fn fetch_graph_data(&self, fsid: &str) -> Result<NetworkGraphData> {
        self.fetch_graph_data_with_limit(fsid, DEFAULT_GRAPH_LIMIT)
            .await
    }

    pub async fn fetch_graph_data_with_limit(
        &self,
        fsid: &str,
        limit: u32,
    ) -> Result<NetworkGraphData> {
        let limit = limit.to_string();
        let request = self.get(self.endpoints.graphs("graph-data")).query(&[
            ("subjects", fsid),
            ("limit", limit.as_str()),
            ("debug", "false"),
        ]);
        self.get_json(request, "fetch network graph data").await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &'static str,
    ) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(SubjectError::Status { action, status });
        }

        Ok(response.json::<T>().await?)
    }

    /// Check whether a subject is on a whiteboard.
    ///
    /// A missing whiteboard (404) is a definite `NotMember`; any other failure
    /// is reported as `Unknown` so the caller can decide whether to retry.
    pub async fn whiteboard_membership(
        &self,
        whiteboard_id: &str,
        fsid: &str,
    ) -> WhiteboardMembership {
        let url = self
            .endpoints
            .management(&format!("whiteboards/{whiteboard_id}/subjects"));

        let response = match self.get(url).send().await {
            Ok(r) => r,
            Err(e) => return WhiteboardMembership::Unknown(e.to_string()),
        };

        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::debug!(whiteboard_id = %whiteboard_id, "Whiteboard not found or empty");
                WhiteboardMembership::NotMember
            }
            status if !status.is_success() => WhiteboardMembership::Unknown(format!(
                "Failed to check whiteboard: {status}"
            )),
            _ => match response.json::<Vec<String>>().await {
                Ok(subjects) if subjects.iter().any(|s| s == fsid) => WhiteboardMembership::Member,
                Ok(_) => WhiteboardMembership::NotMember,
                Err(e) => WhiteboardMembership::Unknown(e.to_string()),
            },
        }
    }

    /// Like [`whiteboard_membership`](Self::whiteboard_membership), with an
    /// unknown outcome treated as "not a member".
    pub async fn is_in_whiteboard(&self, whiteboard_id: &str, fsid: &str) -> bool {
        match self.whiteboard_membership(whiteboard_id, fsid).await {
            WhiteboardMembership::Member => true,
            WhiteboardMembership::NotMember => false,
            WhiteboardMembership::Unknown(reason) => {
                tracing::warn!(
                    whiteboard_id = %whiteboard_id,
                    fsid = %fsid,
                    reason = %reason,
                    "Whiteboard check failed, assuming not a member"
                );
                false
            }
        }
    }

    pub async fn add_to_whiteboard(
        &self,
        whiteboard_id: &str,
        fsid: &str,
    ) -> Result<AddToWhiteboardResponse> {
        let url = self
            .endpoints
            .management(&format!("whiteboards/{whiteboard_id}/subjects"));
        let body = AddToWhiteboardRequest {
            subject: fsid.to_string(),
        };

        tracing::info!(whiteboard_id = %whiteboard_id, fsid = %fsid, "Adding subject to whiteboard");

        let response = self.authorized(self.http.post(url)).json(&body).send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(SubjectError::AuthRequired),
            StatusCode::FORBIDDEN => return Err(SubjectError::Forbidden),
            StatusCode::NOT_FOUND => return Err(SubjectError::WhiteboardNotFound),
            status if !status.is_success() => {
                return Err(SubjectError::Status {
                    action: "add to whiteboard",
                    status,
                })
            }
            _ => {}
        }

        // Success bodies are optional and not always JSON
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(AddToWhiteboardResponse::implicit_success());
        }

        Ok(serde_json::from_str(&text).unwrap_or_else(|_| AddToWhiteboardResponse::implicit_success()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> SubjectClient {
        let root = Url::parse(&server.uri()).unwrap();
        let endpoints = ApiEndpoints::from_root(&root).unwrap();
        let tokens: Arc<dyn TokenSource> = Arc::new(|| Some("test-token".to_string()));
        SubjectClient::new(endpoints, tokens, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_subject() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/management/subjects/fsid_metaverse"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "1",
                "ent_fsid": "fsid_metaverse",
                "ent_name": "Metaverse",
                "synonyms": ["virtual worlds"]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let subject = client.fetch_subject("fsid_metaverse").await.unwrap();
        assert_eq!(subject.ent_name, "Metaverse");
        assert_eq!(subject.synonyms, vec!["virtual worlds"]);
    }

    #[tokio::test]
    async fn test_fetch_subject_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(path("/management/subjects/fsid_missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/management/subjects/fsid_private"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(path("/management/subjects/fsid_broken"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = client_for(&server).await;

        let err = client.fetch_subject("fsid_missing").await.unwrap_err();
        assert!(matches!(err, SubjectError::NotFound(ref fsid) if fsid == "fsid_missing"));

        let err = client.fetch_subject("fsid_private").await.unwrap_err();
        assert!(matches!(err, SubjectError::AuthRequired));

        let err = client.fetch_subject("fsid_broken").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    }

    #[tokio::test]
    async fn test_fetch_stats_primary() {
        let server = MockServer::start().await;
        Mock::given(path("/hitcounts/get-subject-stats/fsid_metaverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Press": 10, "Patents": 20, "Papers": 30, "Books": 40, "Organizations": 50
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let stats = client.fetch_stats("fsid_metaverse").await.unwrap();
        assert_eq!(stats.organizations, Some(50));
        assert_eq!(stats.books, Some(40));
    }

    #[tokio::test]
    async fn test_fetch_stats_falls_back_to_legacy() {
        let server = MockServer::start().await;
        Mock::given(path("/hitcounts/get-subject-stats/fsid_metaverse"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/legacy/subject/get-counts"))
            .and(query_param("slug", "metaverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "counts": { "Organization": 7, "Press": 3, "Patent": 2 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let stats = client.fetch_stats("fsid_metaverse").await.unwrap();
        assert_eq!(
            stats,
            SubjectStats {
                organizations: Some(7),
                press: Some(3),
                patents: Some(2),
                papers: Some(0),
                books: Some(0),
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_stats_both_fail_returns_primary_error() {
        let server = MockServer::start().await;
        Mock::given(path("/hitcounts/get-subject-stats/fsid_metaverse"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(path("/legacy/subject/get-counts"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch_stats("fsid_metaverse").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert!(err.to_string().contains("fetch subject stats"));
    }

    #[tokio::test]
    async fn test_graph_endpoints() {
        let server = MockServer::start().await;
        Mock::given(path("/graphs/ridgeline-data"))
            .and(query_param("subject", "fsid_ai"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_generated_at": 1.5,
                "plot_data": [{"x": 1}],
                "plot_layout": {"title": "AI"},
                "_generated_finish_at": 2.0,
                "_generated_duration": 0.5
            })))
            .mount(&server)
            .await;
        Mock::given(path("/graphs/graph-data"))
            .and(query_param("subjects", "fsid_ai"))
            .and(query_param("limit", "1000"))
            .and(query_param("debug", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "nodes": [{"id": "a"}, {"id": "b"}],
                "edges": [{"source": "a", "target": "b"}],
                "clusters": 1
            })))
            .mount(&server)
            .await;
        Mock::given(path("/graphs/graph-data"))
            .and(query_param("limit", "25"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server).await;

        let trend = client.fetch_trend_data("fsid_ai").await.unwrap();
        assert_eq!(trend.plot_data.len(), 1);
        assert_eq!(trend.generated_duration, 0.5);

        let graph = client.fetch_graph_data("fsid_ai").await.unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.extra.get("clusters"), Some(&json!(1)));

        let err = client
            .fetch_graph_data_with_limit("fsid_ai", 25)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_whiteboard_membership() {
        let server = MockServer::start().await;
        Mock::given(path("/management/whiteboards/wb-1/subjects"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!(["fsid_ai", "fsid_metaverse"])),
            )
            .mount(&server)
            .await;
        Mock::given(path("/management/whiteboards/wb-missing/subjects"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/management/whiteboards/wb-broken/subjects"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server).await;

        assert!(client.is_in_whiteboard("wb-1", "fsid_metaverse").await);
        assert!(!client.is_in_whiteboard("wb-1", "fsid_robotics").await);

        assert_eq!(
            client.whiteboard_membership("wb-missing", "fsid_ai").await,
            WhiteboardMembership::NotMember
        );
        assert!(!client.is_in_whiteboard("wb-missing", "fsid_ai").await);

        assert!(matches!(
            client.whiteboard_membership("wb-broken", "fsid_ai").await,
            WhiteboardMembership::Unknown(_)
        ));
        assert!(!client.is_in_whiteboard("wb-broken", "fsid_ai").await);
    }

    #[tokio::test]
    async fn test_add_to_whiteboard_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/management/whiteboards/wb-1/subjects"))
            .and(body_json(json!({ "subject": "fsid_ai" })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let response = client.add_to_whiteboard("wb-1", "fsid_ai").await.unwrap();
        assert_eq!(
            response,
            AddToWhiteboardResponse {
                success: true,
                message: "Successfully added to whiteboard".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_add_to_whiteboard_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/management/whiteboards/wb-json/subjects"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true, "message": "Added"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/management/whiteboards/wb-text/subjects"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;

        let response = client.add_to_whiteboard("wb-json", "fsid_ai").await.unwrap();
        assert_eq!(response.message, "Added");

        let response = client.add_to_whiteboard("wb-text", "fsid_ai").await.unwrap();
        assert_eq!(response, AddToWhiteboardResponse::implicit_success());
    }

    #[tokio::test]
    async fn test_add_to_whiteboard_errors() {
        let server = MockServer::start().await;
        let cases: [(&str, u16); 4] = [("wb-401", 401), ("wb-403", 403), ("wb-404", 404), ("wb-500", 500)];
        for (id, status) in cases {
            Mock::given(method("POST"))
                .and(path(format!("/management/whiteboards/{id}/subjects")))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;
        }

        let client = client_for(&server).await;

        assert!(matches!(
            client.add_to_whiteboard("wb-401", "fsid_ai").await,
            Err(SubjectError::AuthRequired)
        ));
        assert!(matches!(
            client.add_to_whiteboard("wb-403", "fsid_ai").await,
            Err(SubjectError::Forbidden)
        ));
        assert!(matches!(
            client.add_to_whiteboard("wb-404", "fsid_ai").await,
            Err(SubjectError::WhiteboardNotFound)
        ));
        let err = client.add_to_whiteboard("wb-500", "fsid_ai").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_requests_without_token() {
        let server = MockServer::start().await;
        Mock::given(path("/management/subjects/fsid_ai"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let root = Url::parse(&server.uri()).unwrap();
        let tokens: Arc<dyn TokenSource> = Arc::new(|| None);
        let client = SubjectClient::new(
            ApiEndpoints::from_root(&root).unwrap(),
            tokens,
            Duration::from_secs(5),
        )
        .unwrap();

        assert!(matches!(
            client.fetch_subject("fsid_ai").await,
            Err(SubjectError::AuthRequired)
        ));

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }
}
