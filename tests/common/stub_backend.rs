//! Scripted search backend for exercising the engine without a network.
//!
//! Records for a partition are generated deterministically from its label, so
//! two runs against the same script produce identical results.

use async_trait::async_trait;
use partition_search::constants::fields;
use partition_search::fetcher::{RemotePagination, SearchBackend, SearchResponse};
use partition_search::{FetchError, SearchQuery};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Calls and concurrency observed by a [`StubBackend`]
#[derive(Debug, Default)]
pub struct StubMetrics {
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: Mutex<Vec<(String, u32)>>,
    pub queries: Mutex<Vec<SearchQuery>>,
}

impl StubMetrics {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Pages requested for one partition, in request order
    pub fn pages_for(&self, label: &str) -> Vec<u32> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| called == label)
            .map(|(_, page)| *page)
            .collect()
    }
}

/// Scripted backend keyed by partition label
#[derive(Debug, Clone)]
pub struct StubBackend {
    default_total: usize,
    totals: HashMap<String, usize>,
    failures: HashMap<(String, u32), FetchError>,
    hangs: HashMap<(String, u32), Duration>,
    empty_pages: HashSet<(String, u32)>,
    latencies: HashMap<String, Duration>,
    latency: Duration,
    forced_page_size: Option<u32>,
    reported_total_pages: Option<u32>,
    pub metrics: Arc<StubMetrics>,
}

impl StubBackend {
    pub fn new(default_total: usize) -> Self {
        Self {
            default_total,
            totals: HashMap::new(),
            failures: HashMap::new(),
            hangs: HashMap::new(),
            empty_pages: HashSet::new(),
            latencies: HashMap::new(),
            latency: Duration::ZERO,
            forced_page_size: None,
            reported_total_pages: None,
            metrics: Arc::new(StubMetrics::default()),
        }
    }

    /// Total matching records for one partition
    pub fn with_total(mut self, label: &str, total: usize) -> Self {
        self.totals.insert(label.to_string(), total);
        self
    }

    /// Fail one page of one partition
    pub fn failing(mut self, label: &str, page: u32, error: FetchError) -> Self {
        self.failures.insert((label.to_string(), page), error);
        self
    }

    /// Stall one page of one partition
    pub fn hanging(mut self, label: &str, page: u32, duration: Duration) -> Self {
        self.hangs.insert((label.to_string(), page), duration);
        self
    }

    /// Return no records for one page while still reporting full pagination
    pub fn empty_page(mut self, label: &str, page: u32) -> Self {
        self.empty_pages.insert((label.to_string(), page));
        self
    }

    /// Latency applied to every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Latency applied to every call for one partition, replacing the global one
    pub fn with_partition_latency(mut self, label: &str, latency: Duration) -> Self {
        self.latencies.insert(label.to_string(), latency);
        self
    }

    /// Ignore the requested page size and serve pages of this size
    pub fn with_forced_page_size(mut self, per_page: u32) -> Self {
        self.forced_page_size = Some(per_page);
        self
    }

    /// Report this page count regardless of the records actually served
    pub fn with_reported_total_pages(mut self, total_pages: u32) -> Self {
        self.reported_total_pages = Some(total_pages);
        self
    }

    /// Record the stub would generate at `index` for `label`
    pub fn record(label: &str, index: usize) -> Value {
        json!({ "id": format!("{label}#{index}"), "partition": label })
    }

    /// Every record of a partition, in page order
    pub fn all_records(label: &str, total: usize) -> Vec<Value> {
        (0..total).map(|index| Self::record(label, index)).collect()
    }

    fn respond(&self, label: &str, page: u32, requested_per_page: u32) -> SearchResponse {
        let total = self.totals.get(label).copied().unwrap_or(self.default_total);
        let per_page = self.forced_page_size.unwrap_or(requested_per_page).max(1);
        let total_pages = self
            .reported_total_pages
            .unwrap_or_else(|| total.div_ceil(per_page as usize).max(1) as u32);

        let records = if self.empty_pages.contains(&(label.to_string(), page)) {
            Vec::new()
        } else {
            let start = (page.saturating_sub(1) as usize * per_page as usize).min(total);
            let end = (start + per_page as usize).min(total);
            (start..end).map(|index| Self::record(label, index)).collect()
        };

        SearchResponse::with_records(
            records,
            Some(RemotePagination {
                page: Some(page),
                per_page: Some(per_page),
                total_pages: Some(total_pages),
                total_entries: Some(total as u64),
            }),
        )
    }
}

struct InFlightGuard<'a>(&'a StubMetrics);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SearchBackend for StubBackend {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, FetchError> {
        let label = query
            .get(fields::PARTITION_RANGES)
            .and_then(|ranges| ranges.get(0))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let page = query
            .get(fields::PAGE)
            .and_then(Value::as_u64)
            .unwrap_or(1) as u32;
        let per_page = query
            .get(fields::PER_PAGE)
            .and_then(Value::as_u64)
            .unwrap_or(25) as u32;

        let now = self.metrics.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.metrics.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.metrics);

        self.metrics
            .calls
            .lock()
            .unwrap()
            .push((label.clone(), page));
        self.metrics.queries.lock().unwrap().push(query.clone());

        let latency = self.latencies.get(&label).copied().unwrap_or(self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let key = (label.clone(), page);
        if let Some(hang) = self.hangs.get(&key) {
            tokio::time::sleep(*hang).await;
        }
        if let Some(error) = self.failures.get(&key) {
            return Err(error.clone());
        }

        Ok(self.respond(&label, page, per_page))
    }

    fn backend_name(&self) -> &'static str {
        "stub"
    }
}
