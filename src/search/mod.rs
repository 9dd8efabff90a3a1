//! Web search collaborator used to find candidate sources for a chunk.
//!
//! Results come from a SearxNG instance through its JSON API. Ordering and content are controlled
//! by the upstream engines and are not stable between calls. There is no retry: a failed query
//! fails the whole check.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while querying the search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP transport failure.
    #[error("Search request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("Search provider returned {status}: {body}")]
    UnexpectedStatus {
        /// Status code returned by the provider.
        status: reqwest::StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },
}

/// Candidate source returned for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Result URL, when the provider supplied one.
    pub source: Option<String>,
    /// Text snippet shown for the result; empty when the provider sent none.
    pub snippet: String,
}

/// Interface implemented by full-text web search backends.
#[async_trait]
pub trait WebSearchClient: Send + Sync {
    /// Run a text query and return at most `max_results` candidates.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError>;
}

/// SearxNG JSON API client (`GET /search?format=json`).
pub struct SearxngClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl SearxngClient {
    /// Construct a client for the SearxNG instance at `base_url`.
    pub fn new(base_url: String) -> Result<Self, SearchError> {
        let http = Client::builder().user_agent("plagscan/search").build()?;
        tracing::debug!(url = %base_url, "Initialized search client");
        Ok(Self { http, base_url })
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl WebSearchClient for SearxngClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .http
            .get(self.endpoint())
            .query(&[("q", query), ("format", "json")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = SearchError::UnexpectedStatus { status, body };
            tracing::warn!(error = %error, "Search query failed");
            return Err(error);
        }

        let payload: SearxngResponse = response.json().await?;
        let results: Vec<SearchResult> = payload
            .results
            .into_iter()
            .take(max_results)
            .map(|result| SearchResult {
                source: result.url.filter(|url| !url.is_empty()),
                snippet: result.content.unwrap_or_default(),
            })
            .collect();
        tracing::debug!(results = results.len(), "Search query completed");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    #[tokio::test]
    async fn maps_results_and_truncates_to_limit() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search")
                    .query_param("q", "borrow checker rules")
                    .query_param("format", "json");
                then.status(200).json_body(json!({
                    "query": "borrow checker rules",
                    "results": [
                        { "url": "https://a.example", "title": "A", "content": "first" },
                        { "url": "https://b.example", "title": "B" },
                        { "title": "C", "content": "third" },
                        { "url": "https://d.example", "content": "fourth" }
                    ]
                }));
            })
            .await;

        let client = SearxngClient::new(server.base_url()).expect("client");
        let results = client
            .search("borrow checker rules", 3)
            .await
            .expect("results");

        mock.assert_async().await;
        assert_eq!(
            results,
            vec![
                SearchResult {
                    source: Some("https://a.example".into()),
                    snippet: "first".into(),
                },
                SearchResult {
                    source: Some("https://b.example".into()),
                    snippet: String::new(),
                },
                SearchResult {
                    source: None,
                    snippet: "third".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn missing_results_field_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).json_body(json!({ "query": "x" }));
            })
            .await;

        let client = SearxngClient::new(server.base_url()).expect("client");
        let results = client.search("x", 3).await.expect("results");
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn error_status_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(429).body("Too Many Requests");
            })
            .await;

        let client = SearxngClient::new(server.base_url()).expect("client");
        let error = client.search("x", 3).await.expect_err("rate limited");
        assert!(matches!(
            error,
            SearchError::UnexpectedStatus { status, .. } if status.as_u16() == 429
        ));
    }
}
