//! # Partition Worker Pool
//!
//! A fixed number of workers drain a shared partition list through an atomic
//! claim cursor. Each worker fully resolves the partition it claimed (every
//! page when the fetch is exhaustive) before claiming the next one, so at most
//! `concurrency` partitions are ever in flight.
//!
//! Fetch failures never leave the partition that raised them: a failure on the
//! first page becomes a [`PartitionFailure`], a failure on a later page of an
//! exhaustive fetch keeps the pages already fetched and marks the partition
//! [`IncompleteFetch`]. The page walk never goes past the configured page
//! limit, whatever page count the remote reports.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::constants::limits;
use crate::engine::aggregator::{
    IncompleteFetch, PartitionFailure, PartitionOutcome, PartitionSuccess,
};
use crate::error::{Result, SearchError};
use crate::fetcher::PaginatedFetcher;
use crate::logging::log_partition_operation;
use crate::partition::{PageRequest, Partition, SearchQuery};

/// Paging behavior for one fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Caller's page; ignored for exhaustive fetches
    pub paging: PageRequest,
    /// Fetch every page of every partition
    pub exhaustive: bool,
}

/// Bounded-concurrency resolver for a list of partitions
#[derive(Debug, Clone)]
pub struct PartitionWorkerPool {
    fetcher: PaginatedFetcher,
    concurrency: usize,
    max_page_size: u32,
    max_pages: u32,
}

impl PartitionWorkerPool {
    pub fn new(fetcher: PaginatedFetcher, concurrency: usize, max_page_size: u32) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
            max_page_size: max_page_size.max(1),
            max_pages: limits::MAX_PAGES_PER_PARTITION,
        }
    }

    /// Limit the pages walked per partition in exhaustive fetches
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Resolve every partition, returning `(index, outcome)` pairs in completion order.
    ///
    /// Returns only after every worker has finished; each index appears exactly once.
    pub async fn resolve_all(
        &self,
        request_id: Uuid,
        base_query: Arc<SearchQuery>,
        partitions: Arc<[Partition]>,
        options: ResolveOptions,
    ) -> Result<Vec<(usize, PartitionOutcome)>> {
        let cursor = Arc::new(AtomicUsize::new(0));
        let worker_count = self.concurrency.min(partitions.len());
        let mut join_set = JoinSet::new();

        debug!(
            request_id = %request_id,
            workers = worker_count,
            partitions = partitions.len(),
            exhaustive = options.exhaustive,
            "Starting partition workers"
        );

        for worker_id in 0..worker_count {
            let worker = PartitionWorker {
                request_id,
                fetcher: self.fetcher.clone(),
                max_page_size: self.max_page_size,
                max_pages: self.max_pages,
                base_query: Arc::clone(&base_query),
                partitions: Arc::clone(&partitions),
                cursor: Arc::clone(&cursor),
                options,
            };
            join_set.spawn(
                worker
                    .run()
                    .instrument(info_span!("partition_worker", %request_id, worker_id)),
            );
        }

        let mut resolved = Vec::with_capacity(partitions.len());
        while let Some(result) = join_set.join_next().await {
            let outcomes = result.map_err(|e| {
                SearchError::Internal(format!("Partition worker task failed: {e}"))
            })?;
            resolved.extend(outcomes);
        }

        Ok(resolved)
    }
}

struct PartitionWorker {
    request_id: Uuid,
    fetcher: PaginatedFetcher,
    max_page_size: u32,
    max_pages: u32,
    base_query: Arc<SearchQuery>,
    partitions: Arc<[Partition]>,
    cursor: Arc<AtomicUsize>,
    options: ResolveOptions,
}

impl PartitionWorker {
    async fn run(self) -> Vec<(usize, PartitionOutcome)> {
        let mut outcomes = Vec::new();

        loop {
            let index = self.cursor.fetch_add(1, Ordering::SeqCst);
            let Some(partition) = self.partitions.get(index) else {
                break;
            };
            outcomes.push((index, self.resolve(partition).await));
        }

        outcomes
    }

    async fn resolve(&self, partition: &Partition) -> PartitionOutcome {
        let started = Instant::now();
        let label = partition.label();

        let first_request = if self.options.exhaustive {
            PageRequest::new(1, self.max_page_size)
        } else {
            self.options.paging
        };

        let first_query = self.base_query.for_partition(partition, Some(first_request));
        let first_page = match self.fetcher.fetch(&first_query, Some(first_request)).await {
            Ok(page) => page,
            Err(error) => {
                warn!(partition = %label, error = %error, "Partition fetch failed");
                log_partition_operation(
                    self.request_id,
                    &label,
                    "failed",
                    0,
                    0,
                    started.elapsed().as_millis(),
                    Some(&error.to_string()),
                );
                return PartitionOutcome::Failed(PartitionFailure::from_error(*partition, &error));
            }
        };

        let total_matches = first_page.total_matches;
        let total_pages = first_page.pagination.total_pages;
        let mut records = first_page.records;
        let mut pages_fetched = 1;
        let mut incomplete = None;

        if self.options.exhaustive && total_pages > 1 {
            let last_page = total_pages.min(self.max_pages);
            for page in 2..=last_page {
                let request = first_request.with_page(page);
                let query = self.base_query.for_partition(partition, Some(request));

                match self.fetcher.fetch(&query, Some(request)).await {
                    Ok(next) => {
                        if next.records.is_empty() {
                            debug!(partition = %label, page, "Empty page in exhaustive fetch");
                        }
                        records.extend(next.records);
                        pages_fetched += 1;
                    }
                    Err(error) => {
                        warn!(
                            partition = %label,
                            page,
                            total_pages,
                            error = %error,
                            "Exhaustive fetch stopped early, keeping fetched pages"
                        );
                        incomplete = Some(IncompleteFetch::from_error(page, &error));
                        break;
                    }
                }
            }

            if incomplete.is_none() && total_pages > last_page {
                warn!(
                    partition = %label,
                    total_pages,
                    max_pages = self.max_pages,
                    "Exhaustive fetch reached the page limit"
                );
                incomplete = Some(IncompleteFetch::page_limit(last_page, total_pages));
            }
        }

        if !self.options.exhaustive {
            records.truncate(self.options.paging.per_page as usize);
        }

        log_partition_operation(
            self.request_id,
            &label,
            if incomplete.is_some() {
                "incomplete"
            } else {
                "succeeded"
            },
            records.len(),
            pages_fetched,
            started.elapsed().as_millis(),
            None,
        );

        PartitionOutcome::Succeeded(PartitionSuccess {
            partition: *partition,
            total_matches,
            records,
            incomplete,
        })
    }
}
