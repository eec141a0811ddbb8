//! The TubeLab HTTP client: authentication, request shaping, and the
//! endpoint methods for channel/outlier search, scans, and video lookups.

use std::time::Duration;

use chrono::Utc;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use tubelab_shared::config::DEFAULT_BASE_URL;
use tubelab_shared::{
    ChannelHit, OutlierHit, Result, Scan, ScanRequest, TubeLabError, VideoDetails, VideoId,
};

use crate::filters::{ChannelFilters, OutlierFilters, QueryPairs, RelatedSearch, SortBy};
use crate::pagination::{Page, PageRequest, fetch_all};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("tubelab/", env!("CARGO_PKG_VERSION"));

/// How much of an error body to carry into the error message.
const MAX_ERROR_BODY: usize = 200;

// ---------------------------------------------------------------------------
// ClientOptions
// ---------------------------------------------------------------------------

/// Connection settings for [`TubeLabClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the API.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// TubeLabClient
// ---------------------------------------------------------------------------

/// Asynchronous client for the TubeLab public API.
///
/// Authentication is an `Authorization: Api-Key <key>` header on every
/// request. Search endpoints are paginated client-side via
/// [`fetch_all`](crate::pagination::fetch_all).
pub struct TubeLabClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TubeLabClient {
    /// Create a client against the production API.
    pub fn new(api_key: impl AsRef<str>) -> Result<Self> {
        Self::with_options(api_key, &ClientOptions::default())
    }

    /// Create a client with explicit connection settings.
    pub fn with_options(api_key: impl AsRef<str>, options: &ClientOptions) -> Result<Self> {
        let base_url = Url::parse(&options.base_url).map_err(|e| {
            TubeLabError::config(format!("invalid base URL '{}': {e}", options.base_url))
        })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Api-Key {}", api_key.as_ref()))
            .map_err(|_| TubeLabError::config("API key contains invalid header characters"))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| TubeLabError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    // -- plumbing -----------------------------------------------------------

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| TubeLabError::config(format!("invalid endpoint path '{path}': {e}")))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        // Prefer the API's own message field when the body is JSON.
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY).collect());

        Err(TubeLabError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &QueryPairs) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(%url, params = query.len(), "GET");

        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| TubeLabError::Transport(format!("GET {url}: {e}")))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| TubeLabError::Transport(format!("GET {url}: decoding response: {e}")))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");

        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| TubeLabError::Transport(format!("POST {url}: {e}")))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| TubeLabError::Transport(format!("POST {url}: decoding response: {e}")))
    }

    /// Fetch one page of a search, appending `from`/`size` to the base query.
    async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        base: &QueryPairs,
        page: PageRequest,
    ) -> Result<Page<T>> {
        let mut query = base.clone();
        query.push(("from".into(), page.from.to_string()));
        query.push(("size".into(), page.size.to_string()));
        self.get_json(path, &query).await
    }

    fn query_terms(terms: &[String]) -> QueryPairs {
        terms
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| ("query".to_string(), t.clone()))
            .collect()
    }

    // -- channel search -----------------------------------------------------

    /// Search channels from the niche finder. Collects up to `limit` hits.
    #[instrument(skip_all, fields(limit))]
    pub async fn search_channels(
        &self,
        terms: &[String],
        filters: &ChannelFilters,
        limit: usize,
    ) -> Result<Vec<ChannelHit>> {
        let mut base = Self::query_terms(terms);
        filters.apply(Utc::now(), &mut base);
        fetch_all(limit, async |page| {
            self.fetch_page("/v1/channels", &base, page).await
        })
        .await
    }

    /// Search channels with content related to the query terms.
    #[instrument(skip_all, fields(limit))]
    pub async fn search_related_channels(
        &self,
        terms: &[String],
        filters: &ChannelFilters,
        limit: usize,
    ) -> Result<Vec<ChannelHit>> {
        let mut base = Self::query_terms(terms);
        filters.apply(Utc::now(), &mut base);
        fetch_all(limit, async |page| {
            self.fetch_page("/v1/channels/related", &base, page).await
        })
        .await
    }

    // -- outlier search -----------------------------------------------------

    /// Search outlier videos. Collects up to `limit` hits.
    #[instrument(skip_all, fields(limit))]
    pub async fn search_outliers(
        &self,
        terms: &[String],
        filters: &OutlierFilters,
        sort: SortBy,
        limit: usize,
    ) -> Result<Vec<OutlierHit>> {
        let mut base = Self::query_terms(terms);
        filters.apply(Utc::now(), &mut base)?;
        sort.apply(&mut base);
        fetch_all(limit, async |page| {
            self.fetch_page("/v1/outliers", &base, page).await
        })
        .await
    }

    /// Search outliers related to seed videos, a thumbnail, or seed channels.
    #[instrument(skip_all, fields(limit))]
    pub async fn search_related_outliers(
        &self,
        seed: &RelatedSearch,
        filters: &OutlierFilters,
        limit: usize,
    ) -> Result<Vec<OutlierHit>> {
        seed.validate()?;
        let mut base = QueryPairs::new();
        seed.apply(&mut base);
        filters.apply(Utc::now(), &mut base)?;
        fetch_all(limit, async |page| {
            self.fetch_page("/v1/outliers/related", &base, page).await
        })
        .await
    }

    // -- scans --------------------------------------------------------------

    /// Start a niche scan from queries or seed channels.
    #[instrument(skip_all)]
    pub async fn start_scan(&self, request: &ScanRequest) -> Result<Scan> {
        self.post_json("/v1/scans", request).await
    }

    /// Look up a scan by ID.
    #[instrument(skip(self))]
    pub async fn get_scan(&self, id: &str) -> Result<Scan> {
        self.get_json(&format!("/v1/scans/{id}"), &QueryPairs::new())
            .await
    }

    // -- videos -------------------------------------------------------------

    /// Look up details for a single video.
    #[instrument(skip(self))]
    pub async fn get_video_details(&self, id: &VideoId) -> Result<VideoDetails> {
        self.get_json(&format!("/v1/videos/{id}"), &QueryPairs::new())
            .await
    }

    // -- credentials --------------------------------------------------------

    /// Issue the credential-test request: a minimal channel search.
    /// Succeeds iff the API accepts the key.
    #[instrument(skip_all)]
    pub async fn verify_credentials(&self) -> Result<()> {
        let query: QueryPairs = vec![
            ("query".into(), "minecraft".into()),
            ("size".into(), "1".into()),
        ];
        let url = self.endpoint("/v1/channels")?;
        let response = self
            .http
            .get(url.clone())
            .query(&query)
            .send()
            .await
            .map_err(|e| TubeLabError::Transport(format!("GET {url}: {e}")))?;
        Self::check_status(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> TubeLabClient {
        TubeLabClient::with_options(
            "test-key",
            &ClientOptions {
                base_url: server.uri(),
                timeout_secs: 5,
            },
        )
        .expect("build client")
    }

    fn channel_hits(count: usize) -> Vec<serde_json::Value> {
        (0..count)
            .map(|i| json!({"channelId": format!("UC{i:022}"), "title": format!("channel {i}")}))
            .collect()
    }

    fn outlier_hits(count: usize) -> Vec<serde_json::Value> {
        (0..count)
            .map(|i| json!({"videoId": format!("vid{i:08}"), "views": i * 1000}))
            .collect()
    }

    #[tokio::test]
    async fn sends_api_key_and_query_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/channels"))
            .and(header("Authorization", "Api-Key test-key"))
            .and(query_param("query", "minecraft"))
            .and(query_param("contentKind", "long-form"))
            .and(query_param("from", "0"))
            .and(query_param("size", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": channel_hits(1),
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let filters = ChannelFilters {
            content_kind: Some(crate::filters::ContentKind::LongForm),
            ..Default::default()
        };
        let hits = client
            .search_channels(&["minecraft".into()], &filters, 1)
            .await
            .expect("search");

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title.as_deref(), Some("channel 0"));
    }

    #[tokio::test]
    async fn accumulates_across_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/outliers"))
            .and(query_param("from", "0"))
            .and(query_param("size", "40"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": outlier_hits(40),
                "pagination": {"from": 0, "size": 40, "total": 45},
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/outliers"))
            .and(query_param("from", "1"))
            .and(query_param("size", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": outlier_hits(5),
                "pagination": {"from": 1, "size": 5, "total": 45},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let hits = client
            .search_outliers(
                &["minecraft".into()],
                &OutlierFilters::default(),
                SortBy::Relevance,
                45,
            )
            .await
            .expect("search");

        assert_eq!(hits.len(), 45);
    }

    #[tokio::test]
    async fn non_success_status_maps_to_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/outliers"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "invalid api key"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .search_outliers(&[], &OutlierFilters::default(), SortBy::Relevance, 10)
            .await
            .unwrap_err();

        match err {
            TubeLabError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn related_outliers_validates_seed_before_requesting() {
        let server = MockServer::start().await;
        // No mock mounted: a request would 404, but validation fires first.
        let client = test_client(&server);

        let err = client
            .search_related_outliers(
                &RelatedSearch::Videos(vec![]),
                &OutlierFilters::default(),
                10,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TubeLabError::Validation { .. }));
    }

    #[tokio::test]
    async fn start_scan_posts_expected_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/scans"))
            .and(body_json(json!({
                "findBy": "query",
                "query": ["minecraft"],
                "mode": "fast",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "scan-1",
                "status": "queued",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request =
            ScanRequest::from_queries(vec!["minecraft".into()], tubelab_shared::ScanMode::Fast)
                .expect("valid request");
        let scan = client.start_scan(&request).await.expect("start scan");

        assert_eq!(scan.id, "scan-1");
        assert_eq!(scan.status.as_deref(), Some("queued"));
    }

    #[tokio::test]
    async fn get_video_details_hits_resource_path() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/videos/dQw4w9WgXcQ"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "videoId": "dQw4w9WgXcQ",
                "title": "Never Gonna Give You Up",
                "views": 1_000_000,
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let id = VideoId::new("dQw4w9WgXcQ").expect("valid id");
        let details = client.get_video_details(&id).await.expect("lookup");

        assert_eq!(details.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(details.views, Some(1_000_000));
    }

    #[tokio::test]
    async fn verify_credentials_reports_rejection() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/channels"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.verify_credentials().await.unwrap_err();
        match err {
            TubeLabError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "forbidden");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
