//! # Aggregator
//!
//! Outcome types for resolved partitions and the assembly of per-worker
//! results back into original partition order.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::constants::status_codes;
use crate::error::{FetchError, Result, SearchError};
use crate::partition::{Partition, SearchQuery};

/// Result of resolving one partition: exactly one of success or failure
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionOutcome {
    Succeeded(PartitionSuccess),
    Failed(PartitionFailure),
}

/// Records fetched for a partition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionSuccess {
    #[serde(rename = "partitionLabel")]
    pub partition: Partition,
    pub total_matches: u64,
    pub records: Vec<Value>,
    /// Set when an exhaustive fetch stopped early; `records` holds the pages
    /// fetched before the failing one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incomplete: Option<IncompleteFetch>,
}

/// Why an exhaustive fetch returned partial records
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteFetch {
    /// First page that was not fetched
    pub failed_page: u32,
    pub pages_fetched: u32,
    pub status_code: u16,
    pub error_detail: Value,
}

impl IncompleteFetch {
    pub fn from_error(failed_page: u32, error: &FetchError) -> Self {
        Self {
            failed_page,
            pages_fetched: failed_page.saturating_sub(1),
            status_code: error.status_code(),
            error_detail: error.error_detail(),
        }
    }

    /// The walk stopped after `max_pages` of the `total_pages` the remote reported
    pub fn page_limit(max_pages: u32, total_pages: u32) -> Self {
        Self {
            failed_page: max_pages.saturating_add(1),
            pages_fetched: max_pages,
            status_code: status_codes::PARTIAL_CONTENT,
            error_detail: json!({
                "error": "page limit reached",
                "maxPages": max_pages,
                "totalPages": total_pages,
            }),
        }
    }
}

/// A partition whose first page could not be fetched
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionFailure {
    pub partition: Partition,
    pub status_code: u16,
    pub error_detail: Value,
}

impl PartitionFailure {
    pub fn from_error(partition: Partition, error: &FetchError) -> Self {
        Self {
            partition,
            status_code: error.status_code(),
            error_detail: error.error_detail(),
        }
    }
}

impl Serialize for PartitionFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PartitionFailure", 4)?;
        state.serialize_field("partitionLabel", &self.partition)?;
        state.serialize_field("failed", &true)?;
        state.serialize_field("statusCode", &self.status_code)?;
        state.serialize_field("errorDetail", &self.error_detail)?;
        state.end()
    }
}

impl Serialize for PartitionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PartitionOutcome::Succeeded(success) => success.serialize(serializer),
            PartitionOutcome::Failed(failure) => failure.serialize(serializer),
        }
    }
}

impl PartitionOutcome {
    pub fn partition(&self) -> &Partition {
        match self {
            PartitionOutcome::Succeeded(success) => &success.partition,
            PartitionOutcome::Failed(failure) => &failure.partition,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PartitionOutcome::Failed(_))
    }

    /// Records for a successful partition, empty for a failed one
    pub fn records(&self) -> &[Value] {
        match self {
            PartitionOutcome::Succeeded(success) => &success.records,
            PartitionOutcome::Failed(_) => &[],
        }
    }

    pub fn as_success(&self) -> Option<&PartitionSuccess> {
        match self {
            PartitionOutcome::Succeeded(success) => Some(success),
            PartitionOutcome::Failed(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&PartitionFailure> {
        match self {
            PartitionOutcome::Succeeded(_) => None,
            PartitionOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// Ordered per-partition groups for one top-level search
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub request_id: Uuid,
    /// Resolved base query, echoed for debugging
    pub query: SearchQuery,
    pub exhaustive: bool,
    pub groups: Vec<PartitionOutcome>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl AggregateResult {
    pub fn succeeded(&self) -> impl Iterator<Item = &PartitionSuccess> {
        self.groups.iter().filter_map(PartitionOutcome::as_success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &PartitionFailure> {
        self.groups.iter().filter_map(PartitionOutcome::as_failure)
    }

    /// Number of records across all successful groups
    pub fn total_records(&self) -> usize {
        self.groups.iter().map(|group| group.records().len()).sum()
    }
}

/// Place worker results back at their original partition index.
///
/// Every index in `0..partition_count` must be written exactly once.
pub fn assemble(
    partition_count: usize,
    resolved: impl IntoIterator<Item = (usize, PartitionOutcome)>,
) -> Result<Vec<PartitionOutcome>> {
    let mut slots: Vec<Option<PartitionOutcome>> = vec![None; partition_count];

    for (index, outcome) in resolved {
        let slot = slots.get_mut(index).ok_or_else(|| {
            SearchError::Internal(format!(
                "Partition index {index} out of range ({partition_count} partitions)"
            ))
        })?;
        if slot.replace(outcome).is_some() {
            return Err(SearchError::Internal(format!(
                "Partition index {index} resolved more than once"
            )));
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| {
                SearchError::Internal(format!("Partition index {index} was never resolved"))
            })
        })
        .collect()
}
