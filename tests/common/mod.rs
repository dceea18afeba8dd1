#![allow(dead_code)]

pub mod http_stub;
pub mod strategies;
pub mod stub_backend;

pub use http_stub::*;
pub use stub_backend::*;

use partition_search::engine::PartitionSearchEngine;
use partition_search::{EngineConfig, JsonIntentTranslator};
use std::sync::Arc;

/// Engine over a stub backend with the given concurrency and per-call timeout
pub fn engine_with(backend: StubBackend, concurrency: usize, timeout_ms: u64) -> PartitionSearchEngine {
    let config = EngineConfig {
        concurrency,
        request_timeout_ms: timeout_ms,
        ..EngineConfig::default()
    };
    engine_with_config(backend, config)
}

pub fn engine_with_config(backend: StubBackend, config: EngineConfig) -> PartitionSearchEngine {
    PartitionSearchEngine::new(Arc::new(JsonIntentTranslator), Arc::new(backend), config)
}
