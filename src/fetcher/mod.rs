//! # Paginated Fetcher
//!
//! One remote call per invocation: send a partitioned query, normalize the
//! remote response into a [`SearchPage`], and surface transport, HTTP and
//! timeout failures as [`FetchError`] for the worker pool to scope to the
//! partition that raised them.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;
use crate::partition::{PageRequest, SearchQuery};

pub use http::HttpSearchClient;

/// Remote search API
///
/// Implemented over HTTP by [`HttpSearchClient`]; tests and embedding
/// applications can supply their own backend.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute exactly one search request
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, FetchError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Raw response body of the remote search API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizations: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<RemotePagination>,
}

impl SearchResponse {
    /// Response carrying plain records and pagination metadata
    pub fn with_records(records: Vec<Value>, pagination: Option<RemotePagination>) -> Self {
        Self {
            records: Some(records),
            pagination,
            ..Self::default()
        }
    }

    /// All returned records, in response order
    pub fn into_records(self) -> Vec<Value> {
        [self.records, self.accounts, self.organizations]
            .into_iter()
            .flatten()
            .flatten()
            .collect()
    }
}

/// Pagination metadata as reported by the remote API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemotePagination {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, alias = "pageSize", alias = "page_size")]
    pub per_page: Option<u32>,
    #[serde(default, alias = "totalPages")]
    pub total_pages: Option<u32>,
    #[serde(default, alias = "totalEntries")]
    pub total_entries: Option<u64>,
}

/// Normalized pagination for one fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl PageInfo {
    /// Check if pages remain after this one
    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

/// One normalized page of results
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub total_matches: u64,
    pub records: Vec<Value>,
    pub pagination: PageInfo,
}

impl SearchPage {
    /// Normalize a raw response for the page that was requested.
    ///
    /// Without remote pagination metadata the total falls back to the number of
    /// records returned; a missing page count is derived from the total.
    pub fn from_response(response: SearchResponse, requested: Option<PageRequest>) -> Self {
        let remote = response.pagination.clone().unwrap_or_default();
        let records = response.into_records();

        let total_matches = remote.total_entries.unwrap_or(records.len() as u64);
        let page = remote
            .page
            .or(requested.map(|r| r.page))
            .unwrap_or(1)
            .max(1);
        let per_page = remote
            .per_page
            .or(requested.map(|r| r.per_page))
            .unwrap_or(records.len() as u32);
        let total_pages = remote
            .total_pages
            .unwrap_or_else(|| total_pages(total_matches, per_page));

        Self {
            total_matches,
            records,
            pagination: PageInfo {
                page,
                per_page,
                total_pages,
            },
        }
    }
}

/// Ceiling division of a total count into pages, at least one page
pub fn total_pages(total_count: u64, per_page: u32) -> u32 {
    if per_page == 0 || total_count == 0 {
        return 1;
    }
    u32::try_from(total_count.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX)
}

/// Single-call fetcher with a per-call timeout
#[derive(Clone)]
pub struct PaginatedFetcher {
    backend: Arc<dyn SearchBackend>,
    timeout: Duration,
}

impl std::fmt::Debug for PaginatedFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedFetcher")
            .field("backend", &self.backend.backend_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PaginatedFetcher {
    pub fn new(backend: Arc<dyn SearchBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Fetch one page for an already-partitioned query
    pub async fn fetch(
        &self,
        query: &SearchQuery,
        requested: Option<PageRequest>,
    ) -> Result<SearchPage, FetchError> {
        let response = tokio::time::timeout(self.timeout, self.backend.search(query))
            .await
            .map_err(|_| FetchError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            })??;

        let page = SearchPage::from_response(response, requested);
        debug!(
            page = page.pagination.page,
            total_pages = page.pagination.total_pages,
            total_matches = page.total_matches,
            records = page.records.len(),
            "Fetched search page"
        );
        Ok(page)
    }
}
