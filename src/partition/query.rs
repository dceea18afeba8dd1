//! # Partition Query Builder
//!
//! Derives a partition-specific query from the base query produced by the
//! translator. Derivation is pure: the base query is borrowed immutably and
//! every call returns an independent deep copy, so concurrently running
//! workers can share one base query without aliasing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::fields;
use crate::partition::range::Partition;

/// Structured query sent to the remote search API
///
/// Opaque to the engine apart from the boundary, paging and nested-query fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchQuery(Map<String, Value>);

impl SearchQuery {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a query from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Derive the query for one partition.
    ///
    /// Conflicting global headcount boundaries are removed at the top level and
    /// inside the nested query object, the partition range is written to both
    /// locations, and `paging` (when given) overrides the page fields.
    pub fn for_partition(&self, partition: &Partition, paging: Option<PageRequest>) -> SearchQuery {
        let mut derived = self.0.clone();
        let ranges = Value::Array(vec![Value::String(partition.label())]);

        apply_partition(&mut derived, &ranges);
        if let Some(Value::Object(nested)) = derived.get_mut(fields::NESTED_QUERY) {
            apply_partition(nested, &ranges);
        }

        if let Some(paging) = paging {
            derived.insert(fields::PAGE.to_string(), Value::from(paging.page));
            derived.insert(fields::PER_PAGE.to_string(), Value::from(paging.per_page));
        }

        SearchQuery(derived)
    }
}

fn apply_partition(target: &mut Map<String, Value>, ranges: &Value) {
    for field in fields::CONFLICTING_BOUNDARIES {
        target.remove(*field);
    }
    target.insert(fields::PARTITION_RANGES.to_string(), ranges.clone());
}

/// Page number and page size for one remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-indexed page number
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Same page size, different page
    pub fn with_page(self, page: u32) -> Self {
        Self { page, ..self }
    }
}
