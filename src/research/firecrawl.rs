//! Firecrawl-backed research client.
//!
//! Talks to the Firecrawl v1 REST API (`/v1/search`, `/v1/scrape`) with
//! bearer auth, per-request timeouts and exponential-backoff retries on
//! transient failures.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{ResearchClient, ScrapedPage, SearchHit};
use crate::error::ResearchError;

/// Public Firecrawl endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds)
const RETRY_BASE_DELAY_MS: u64 = 1000;

#[derive(Debug, Serialize)]
struct ScrapeOptions {
    formats: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    limit: usize,
    scrape_options: ScrapeOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: Vec<&'static str>,
    only_main_content: bool,
}

/// `{ success, data, error }` wrapper around every Firecrawl response.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: Option<bool>,
    data: Option<T>,
    error: Option<String>,
}

/// Firecrawl search/scrape client.
///
/// # Example
/// ```ignore
/// let client = FirecrawlClient::new("fc-...")
///     .with_timeout(Duration::from_secs(60))
///     .with_max_retries(2);
/// let hits = client.search("vector databases", 3).await?;
/// ```
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    api_key: String,
    base_url: String,
    client: Client,
    timeout: Duration,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl FirecrawlClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: MAX_RETRIES,
            retry_base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
        }
    }

    /// Point at a different deployment (self-hosted Firecrawl, test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// POST with retry and backoff
    async fn post_with_retry<B, T>(&self, path: &str, body: &B) -> Result<T, ResearchError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let mut last_error = ResearchError::Unknown("No attempts made".to_string());

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_base_delay * 2u32.pow(attempt - 1);
                debug!(attempt, delay_ms = delay.as_millis(), path, "Retrying Firecrawl request");
                tokio::time::sleep(delay).await;
            }

            match self.post_once(path, body).await {
                Ok(data) => return Ok(data),
                Err(e) => {
                    if !e.is_retryable() {
                        return Err(e);
                    }
                    warn!(attempt, path, error = %e, "Firecrawl request failed, will retry");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn post_once<B, T>(&self, path: &str, body: &B) -> Result<T, ResearchError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(ResearchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ResearchError::from_status(status.as_u16(), error_text));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ResearchError::ParseError(e.to_string()))?;

        if envelope.success == Some(false) {
            return Err(ResearchError::Unsuccessful(
                envelope.error.unwrap_or_else(|| "no error message".to_string()),
            ));
        }

        envelope
            .data
            .ok_or_else(|| ResearchError::ParseError("response has no data field".to_string()))
    }
}

#[async_trait]
impl ResearchClient for FirecrawlClient {
    async fn search(
        &self,
        phrase: &str,
        num_results: usize,
    ) -> Result<Vec<SearchHit>, ResearchError> {
        if num_results == 0 {
            return Ok(Vec::new());
        }

        debug!(query = %phrase, limit = num_results, "Firecrawl search");

        let request = SearchRequest {
            query: phrase,
            limit: num_results,
            scrape_options: ScrapeOptions {
                formats: vec!["markdown"],
            },
        };

        let hits: Vec<SearchHit> = self.post_with_retry("/v1/search", &request).await?;

        if hits.is_empty() {
            warn!(query = %phrase, "No search results found");
        } else {
            debug!(query = %phrase, count = hits.len(), "Search completed");
        }

        Ok(hits.into_iter().take(num_results).collect())
    }

    async fn scrape(&self, url: &str) -> Option<ScrapedPage> {
        if url.trim().is_empty() {
            return None;
        }

        let request = ScrapeRequest {
            url,
            formats: vec!["markdown"],
            only_main_content: true,
        };

        match self.post_with_retry::<_, ScrapedPage>("/v1/scrape", &request).await {
            Ok(page) if !page.markdown.trim().is_empty() => {
                debug!(url, chars = page.markdown.len(), "Scraped page");
                Some(page)
            }
            Ok(_) => {
                warn!(url, "Scrape returned no content");
                None
            }
            Err(e) => {
                warn!(url, error = %e, "Scrape failed");
                None
            }
        }
    }

    fn name(&self) -> &str {
        "firecrawl"
    }
}


/// HTTP tests against a mocked Firecrawl server
#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FirecrawlClient {
        FirecrawlClient::new("fc-test-key")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(0)
            .with_retry_base_delay(Duration::from_millis(10))
    }

    fn sample_search_response() -> serde_json::Value {
        serde_json::json!({
            "success": true,
            "data": [
                {
                    "url": "https://www.pinecone.io",
                    "title": "Pinecone",
                    "description": "The vector database for AI",
                    "markdown": "# Pinecone\nManaged vector database.",
                    "metadata": { "title": "Pinecone: Vector Database", "sourceURL": "https://www.pinecone.io" }
                },
                {
                    "url": "https://weaviate.io",
                    "description": "Open source vector database",
                    "metadata": {}
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_http_successful_search() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .and(header("Authorization", "Bearer fc-test-key"))
            .and(body_partial_json(serde_json::json!({
                "query": "vector databases",
                "limit": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_search_response()))
            .mount(&server)
            .await;

        let hits = client_for(&server).search("vector databases", 2).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://www.pinecone.io");
        assert_eq!(hits[0].title(), Some("Pinecone: Vector Database"));
        assert_eq!(hits[0].snippet(), "# Pinecone\nManaged vector database.");
        assert_eq!(hits[1].title(), None);
        assert_eq!(hits[1].snippet(), "Open source vector database");
    }

    #[tokio::test]
    async fn test_http_search_truncates_to_limit() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_search_response()))
            .mount(&server)
            .await;

        let hits = client_for(&server).search("anything", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_http_empty_results_are_ok() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "success": true, "data": [] })),
            )
            .mount(&server)
            .await;

        let hits = client_for(&server).search("nonexistent xyz123", 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_http_zero_results_skips_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let hits = client_for(&server).search("anything", 0).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_http_unauthorized_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let result = client_for(&server).search("test", 3).await;
        assert!(matches!(result, Err(ResearchError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_http_unsuccessful_envelope() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "error": "Search engine unavailable"
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).search("test", 3).await;
        assert!(matches!(result, Err(ResearchError::Unsuccessful(msg)) if msg.contains("unavailable")));
    }

    #[tokio::test]
    async fn test_http_malformed_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
            .mount(&server)
            .await;

        let result = client_for(&server).search("test", 3).await;
        assert!(matches!(result, Err(ResearchError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_http_retry_on_server_error() {
        let server = MockServer::start().await;

        // First two calls fail with 500, third succeeds
        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_search_response()))
            .mount(&server)
            .await;

        let client = client_for(&server).with_max_retries(3);
        let hits = client.search("test", 5).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_http_no_retry_on_payment_required() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(402))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).with_max_retries(3);
        let result = client.search("test", 3).await;
        assert!(matches!(result, Err(ResearchError::PaymentRequired)));
    }

    #[tokio::test]
    async fn test_http_rate_limit_exhausts_retries() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server).with_max_retries(2);
        let result = client.search("test", 3).await;
        assert!(matches!(result, Err(ResearchError::RateLimited)));
    }

    #[tokio::test]
    async fn test_http_scrape_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .and(body_partial_json(serde_json::json!({ "url": "https://qdrant.tech" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": {
                    "markdown": "# Qdrant\nOpen-source vector search engine written in Rust.",
                    "metadata": { "title": "Qdrant" }
                }
            })))
            .mount(&server)
            .await;

        let page = client_for(&server).scrape("https://qdrant.tech").await.unwrap();
        assert!(page.markdown.contains("written in Rust"));
        assert_eq!(page.metadata.unwrap().title.as_deref(), Some("Qdrant"));
    }

    #[tokio::test]
    async fn test_http_scrape_failure_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        assert!(client_for(&server).scrape("https://gone.example").await.is_none());
    }

    #[tokio::test]
    async fn test_http_scrape_empty_markdown_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": { "markdown": "   " }
            })))
            .mount(&server)
            .await;

        assert!(client_for(&server).scrape("https://blank.example").await.is_none());
    }

    #[tokio::test]
    async fn test_scrape_empty_url_skips_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert!(client_for(&server).scrape("").await.is_none());
    }
}
