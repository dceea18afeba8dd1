//! # Search Configuration
//!
//! Layered configuration for the remote search API connection and the
//! partition engine.
//!
//! Precedence (highest to lowest):
//! 1. Environment variables (`PARTITION_SEARCH__ENGINE__CONCURRENCY=8`)
//! 2. Config file (`config/partition-search.toml`)
//! 3. Default values
//!
//! ```rust
//! use partition_search::config::SearchConfig;
//!
//! let config = SearchConfig::default();
//! assert_eq!(config.engine.concurrency, 4);
//! assert_eq!(config.engine.max_page_size, 100);
//! ```

use config::{Config, Environment, File};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::constants::limits;
use crate::error::{Result, SearchError};

/// Default config file location, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config/partition-search";

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "PARTITION_SEARCH";

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Remote search API connection
    pub api: ApiConfig,
    /// Partition fan-out settings
    pub engine: EngineConfig,
}

/// Remote search API connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL for the API (e.g., "<https://api.example.com>")
    pub base_url: String,
    /// Path of the search endpoint, joined onto `base_url`
    pub search_path: String,
    /// Transport-level timeout in milliseconds
    pub timeout_ms: u64,
    /// API key sent with every request, if the API requires one
    pub api_key: Option<String>,
    /// Header carrying the API key
    pub api_key_header: String,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            search_path: "/v1/mixed_companies/search".to_string(),
            timeout_ms: limits::DEFAULT_REQUEST_TIMEOUT_MS,
            api_key: None,
            api_key_header: "X-Api-Key".to_string(),
            user_agent: format!("partition-search/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Partition engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum partitions in flight at once
    pub concurrency: usize,
    /// Largest page size the remote API accepts
    pub max_page_size: u32,
    /// Page size used when a request does not specify one
    pub default_page_size: u32,
    /// Timeout applied to every individual remote call
    pub request_timeout_ms: u64,
    /// Most pages walked for one partition in an exhaustive fetch
    pub max_pages_per_partition: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: limits::DEFAULT_CONCURRENCY,
            max_page_size: limits::MAX_PAGE_SIZE,
            default_page_size: limits::DEFAULT_PAGE_SIZE,
            request_timeout_ms: limits::DEFAULT_REQUEST_TIMEOUT_MS,
            max_pages_per_partition: limits::MAX_PAGES_PER_PARTITION,
        }
    }
}

impl EngineConfig {
    /// Per-call timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl SearchConfig {
    /// Load configuration from the default file location and environment
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(Self::environment())
            .build()?
            .try_deserialize::<Self>()?;

        config.validate()?;
        debug!(?config, "Loaded search configuration");
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring environment overrides
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(Self::environment())
            .build()?
            .try_deserialize::<Self>()?;

        config.validate()?;
        debug!(path = %path.display(), "Loaded search configuration from file");
        Ok(config)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api.base_url).map_err(|e| {
            SearchError::configuration(format!("Invalid base URL {}: {e}", self.api.base_url))
        })?;

        if self.api.timeout_ms == 0 {
            return Err(SearchError::configuration("api.timeout_ms must be positive"));
        }
        if self.engine.concurrency == 0 {
            return Err(SearchError::configuration(
                "engine.concurrency must be at least 1",
            ));
        }
        if self.engine.max_page_size == 0 || self.engine.default_page_size == 0 {
            return Err(SearchError::configuration("page sizes must be positive"));
        }
        if self.engine.default_page_size > self.engine.max_page_size {
            return Err(SearchError::configuration(format!(
                "engine.default_page_size ({}) exceeds engine.max_page_size ({})",
                self.engine.default_page_size, self.engine.max_page_size
            )));
        }
        if self.engine.request_timeout_ms == 0 {
            return Err(SearchError::configuration(
                "engine.request_timeout_ms must be positive",
            ));
        }
        if self.engine.max_pages_per_partition == 0 {
            return Err(SearchError::configuration(
                "engine.max_pages_per_partition must be at least 1",
            ));
        }

        Ok(())
    }
}
