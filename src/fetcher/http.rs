//! # HTTP Search Client
//!
//! reqwest-backed [`SearchBackend`] for the remote search API. Each call is a
//! single JSON POST; non-2xx responses are returned as [`FetchError::Http`]
//! with the response body intact. No retries happen here.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::error::{FetchError, Result, SearchError};
use crate::fetcher::{SearchBackend, SearchResponse};
use crate::partition::SearchQuery;

/// HTTP client for the remote search endpoint
#[derive(Clone)]
pub struct HttpSearchClient {
    client: Client,
    search_url: Url,
    timeout_ms: u64,
}

impl std::fmt::Debug for HttpSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSearchClient")
            .field("search_url", &self.search_url.as_str())
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl HttpSearchClient {
    /// Create a client from API configuration
    ///
    /// Fails when the base URL or API key header cannot be used.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SearchError::configuration(format!("Invalid base URL {}: {e}", config.base_url))
        })?;
        let search_url = base_url.join(&config.search_path).map_err(|e| {
            SearchError::configuration(format!("Failed to construct search URL: {e}"))
        })?;

        let mut client_builder = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone());

        if let Some(api_key) = config.api_key.as_deref().filter(|key| !key.is_empty()) {
            let mut default_headers = HeaderMap::new();
            let header_name = HeaderName::from_bytes(config.api_key_header.as_bytes())
                .map_err(|e| {
                    SearchError::configuration(format!("Invalid API key header name: {e}"))
                })?;
            let mut header_value = HeaderValue::from_str(api_key)
                .map_err(|e| SearchError::configuration(format!("Invalid API key: {e}")))?;
            header_value.set_sensitive(true);
            default_headers.insert(header_name, header_value);
            client_builder = client_builder.default_headers(default_headers);

            debug!(header = %config.api_key_header, "Configured API key authentication");
        }

        let client = client_builder
            .build()
            .map_err(|e| SearchError::configuration(format!("Failed to create HTTP client: {e}")))?;

        info!(
            search_url = %search_url,
            timeout_ms = config.timeout_ms,
            auth_enabled = config.api_key.is_some(),
            "Created search API client"
        );

        Ok(Self {
            client,
            search_url,
            timeout_ms: config.timeout_ms,
        })
    }

    /// Get the resolved search endpoint for debugging/logging
    pub fn search_url(&self) -> &str {
        self.search_url.as_str()
    }

    /// Map a reqwest failure from either the send or the body read.
    ///
    /// The client timeout covers the whole exchange, so a body that stalls
    /// after the headers arrive is still a timeout.
    fn map_request_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            FetchError::from(err)
        }
    }
}

#[async_trait]
impl SearchBackend for HttpSearchClient {
    async fn search(&self, query: &SearchQuery) -> std::result::Result<SearchResponse, FetchError> {
        let response = self
            .client
            .post(self.search_url.clone())
            .json(query)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, error = %error_text, "Search request failed");
            return Err(FetchError::http(status.as_u16(), error_text));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_request_error(e))?;
        serde_json::from_slice::<SearchResponse>(&body).map_err(|e| {
            FetchError::InvalidResponse(format!("Failed to parse search response: {e}"))
        })
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
