//! # Record Enrichment
//!
//! Best-effort enrichment of fetched records. Runs after aggregation and never
//! fails: a record whose lookup errors is kept unchanged.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::limits;
use crate::engine::{AggregateResult, PartitionOutcome};
use crate::error::EnrichmentError;

/// Record lookup service
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Return an enriched copy of `record`
    async fn enrich(&self, record: &Value) -> Result<Value, EnrichmentError>;
}

/// Enrich one record, falling back to the original on failure
pub async fn enrich_record(enricher: &dyn Enricher, record: Value) -> Value {
    match enricher.enrich(&record).await {
        Ok(enriched) => enriched,
        Err(error) => {
            warn!(error = %error, "Enrichment failed, keeping original record");
            record
        }
    }
}

/// Enrich a batch of records with bounded concurrency, preserving order
pub async fn enrich_records(
    enricher: &dyn Enricher,
    records: Vec<Value>,
    concurrency: usize,
) -> Vec<Value> {
    stream::iter(records)
        .map(|record| enrich_record(enricher, record))
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Enrich the records of every successful group in place
pub async fn enrich_aggregate(enricher: &dyn Enricher, result: &mut AggregateResult) {
    for group in &mut result.groups {
        if let PartitionOutcome::Succeeded(success) = group {
            let records = std::mem::take(&mut success.records);
            debug!(
                partition = %success.partition,
                records = records.len(),
                "Enriching partition records"
            );
            success.records =
                enrich_records(enricher, records, limits::ENRICHMENT_CONCURRENCY).await;
        }
    }
}
