//! # Partitioned Search Engine
//!
//! Entry point for a partitioned search: validate the request, translate the
//! intent into a base query, normalize partition ranges, fan out through the
//! [`PartitionWorkerPool`] and assemble the ordered [`AggregateResult`].
//!
//! ```rust,no_run
//! use partition_search::config::SearchConfig;
//! use partition_search::engine::{PartitionSearchEngine, PartitionSearchRequest};
//! use partition_search::translator::JsonIntentTranslator;
//! use std::sync::Arc;
//!
//! # async fn example() -> partition_search::Result<()> {
//! let config = SearchConfig::load()?;
//! let engine = PartitionSearchEngine::from_config(&config, Arc::new(JsonIntentTranslator))?;
//!
//! let result = engine
//!     .search_by_partitions(PartitionSearchRequest {
//!         intent: r#"{"q_keywords": "climate tech"}"#.to_string(),
//!         exhaustive: true,
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! for group in &result.groups {
//!     println!("{}: {} records", group.partition(), group.records().len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod worker_pool;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::{EngineConfig, SearchConfig};
use crate::error::{Result, SearchError};
use crate::fetcher::{HttpSearchClient, PaginatedFetcher, SearchBackend};
use crate::partition::{normalize_ranges, PageRequest, Partition, SearchQuery};
use crate::translator::Translator;

pub use aggregator::{
    assemble, AggregateResult, IncompleteFetch, PartitionFailure, PartitionOutcome,
    PartitionSuccess,
};
pub use worker_pool::{PartitionWorkerPool, ResolveOptions};

/// Caller request for one partitioned search
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartitionSearchRequest {
    /// Free-text search intent handed to the translator
    pub intent: String,
    /// 1-indexed page; defaults to 1
    pub page: Option<u32>,
    /// Page size; defaults to the configured default, clamped to the maximum
    pub page_size: Option<u32>,
    /// Partition range descriptors; empty selects the default set
    #[serde(alias = "ranges")]
    pub partitions: Vec<Value>,
    /// Fetch every page of every partition
    pub exhaustive: bool,
}

/// Paging and fan-out options for a search with an already-resolved base query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub page: u32,
    pub page_size: u32,
    pub exhaustive: bool,
}

/// Fan-out search engine
#[derive(Clone)]
pub struct PartitionSearchEngine {
    translator: Arc<dyn Translator>,
    pool: PartitionWorkerPool,
    config: EngineConfig,
}

impl std::fmt::Debug for PartitionSearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionSearchEngine")
            .field("pool", &self.pool)
            .field("config", &self.config)
            .finish()
    }
}

impl PartitionSearchEngine {
    /// Create an engine over any search backend
    pub fn new(
        translator: Arc<dyn Translator>,
        backend: Arc<dyn SearchBackend>,
        config: EngineConfig,
    ) -> Self {
        let fetcher = PaginatedFetcher::new(backend, config.request_timeout());
        let pool = PartitionWorkerPool::new(fetcher, config.concurrency, config.max_page_size)
            .with_max_pages(config.max_pages_per_partition);
        Self {
            translator,
            pool,
            config,
        }
    }

    /// Create an engine backed by the HTTP search client
    pub fn from_config(config: &SearchConfig, translator: Arc<dyn Translator>) -> Result<Self> {
        config.validate()?;
        let backend = HttpSearchClient::new(&config.api)?;
        Ok(Self::new(translator, Arc::new(backend), config.engine.clone()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Translate the intent and search every partition.
    ///
    /// Request validation and translation failures abort the whole search;
    /// partition failures are reported on their own groups.
    pub async fn search_by_partitions(
        &self,
        request: PartitionSearchRequest,
    ) -> Result<AggregateResult> {
        let intent = request.intent.trim();
        if intent.is_empty() {
            return Err(SearchError::invalid_request("Search intent is required"));
        }
        let options = self.resolve_options(request.page, request.page_size, request.exhaustive)?;

        let request_id = Uuid::new_v4();
        let base_query = self
            .translator
            .translate(intent, options.page, options.page_size)
            .instrument(info_span!("translate", %request_id))
            .await?;

        self.execute(request_id, base_query, &request.partitions, options)
            .await
    }

    /// Search every partition for an already-structured base query
    pub async fn run_partitions(
        &self,
        base_query: SearchQuery,
        descriptors: &[Value],
        options: SearchOptions,
    ) -> Result<AggregateResult> {
        let options = self.resolve_options(
            Some(options.page),
            Some(options.page_size),
            options.exhaustive,
        )?;
        self.execute(Uuid::new_v4(), base_query, descriptors, options)
            .await
    }

    fn resolve_options(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
        exhaustive: bool,
    ) -> Result<SearchOptions> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(SearchError::invalid_request("page must be 1 or greater"));
        }

        let page_size = match page_size {
            Some(0) => {
                return Err(SearchError::invalid_request(
                    "page_size must be 1 or greater",
                ))
            }
            Some(size) if size > self.config.max_page_size => {
                debug!(
                    requested = size,
                    max = self.config.max_page_size,
                    "Clamping page size to maximum"
                );
                self.config.max_page_size
            }
            Some(size) => size,
            None => self.config.default_page_size,
        };

        Ok(SearchOptions {
            page,
            page_size,
            exhaustive,
        })
    }

    async fn execute(
        &self,
        request_id: Uuid,
        base_query: SearchQuery,
        descriptors: &[Value],
        options: SearchOptions,
    ) -> Result<AggregateResult> {
        let started_at = Utc::now();
        let partitions: Arc<[Partition]> = normalize_ranges(descriptors).into();
        let base_query = Arc::new(base_query);

        info!(
            request_id = %request_id,
            partitions = partitions.len(),
            dropped = descriptors.len().saturating_sub(partitions.len()),
            concurrency = self.pool.concurrency(),
            exhaustive = options.exhaustive,
            "Starting partitioned search"
        );

        let resolved = self
            .pool
            .resolve_all(
                request_id,
                Arc::clone(&base_query),
                Arc::clone(&partitions),
                ResolveOptions {
                    paging: PageRequest::new(options.page, options.page_size),
                    exhaustive: options.exhaustive,
                },
            )
            .await?;
        let groups = assemble(partitions.len(), resolved)?;

        let result = AggregateResult {
            request_id,
            query: Arc::unwrap_or_clone(base_query),
            exhaustive: options.exhaustive,
            groups,
            started_at,
            completed_at: Utc::now(),
        };

        info!(
            request_id = %request_id,
            succeeded = result.succeeded().count(),
            failed = result.failed().count(),
            records = result.total_records(),
            elapsed_ms = (result.completed_at - started_at).num_milliseconds(),
            "Partitioned search completed"
        );

        Ok(result)
    }
}
