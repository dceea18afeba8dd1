#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Partition Search
//!
//! Fan-out search engine for rate- and pagination-constrained search APIs.
//!
//! ## Overview
//!
//! One search intent is translated into a structured base query, split into
//! headcount partitions, and each partition is searched as an independent
//! sub-query. Partitions are resolved by a fixed-size worker pool, optionally
//! walking every page, and reassembled in their original order. A partition
//! that fails is reported on its own group without disturbing the others.
//!
//! ## Module Organization
//!
//! - [`partition`] - Range normalization and per-partition query derivation
//! - [`fetcher`] - Remote search backend and single-page fetching
//! - [`engine`] - Worker pool, aggregation and the top-level search operation
//! - [`translator`] - Intent-to-query translation boundary
//! - [`enrichment`] - Best-effort record enrichment
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests
//! ```

pub mod config;
pub mod constants;
pub mod engine;
pub mod enrichment;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod partition;
pub mod translator;

pub use crate::config::{ApiConfig, EngineConfig, SearchConfig};
pub use engine::{
    AggregateResult, PartitionOutcome, PartitionSearchEngine, PartitionSearchRequest,
    SearchOptions,
};
pub use error::{FetchError, Result, SearchError, TranslationError};
pub use fetcher::{HttpSearchClient, SearchBackend, SearchResponse};
pub use partition::{Partition, SearchQuery};
pub use translator::{JsonIntentTranslator, Translator};
