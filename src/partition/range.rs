//! # Range Normalizer
//!
//! Validates caller-supplied partition boundaries and canonicalizes them into
//! [`Partition`] values whose label is `"<min>,<max>"` (or `"<min>,"` for an
//! open-ended range).
//!
//! Accepted descriptor shapes:
//!
//! - a delimited string: `"11,50"`, `"11-50"`, `"11:50"`, `"10001,"`, `"10001+"`
//! - a two-element array: `[11, 50]`, `["11", "50"]`, `[10001, null]`
//! - an object: `{"min": 11, "max": 50}`, `{"min": 10001}`
//!
//! Anything else is dropped without affecting the other descriptors.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::constants::DEFAULT_PARTITIONS;

/// One headcount sub-range of the search space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    min: u64,
    max: Option<u64>,
}

impl Partition {
    /// Create a partition, enforcing `min >= 1` and `max >= min`
    pub fn new(min: u64, max: Option<u64>) -> Option<Self> {
        if min == 0 {
            return None;
        }
        match max {
            Some(max) if max < min => None,
            _ => Some(Self { min, max }),
        }
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    /// Upper bound, `None` when the range is open-ended
    pub fn max(&self) -> Option<u64> {
        self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }

    /// Canonical `"<min>,<max>"` form sent to the remote API
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Whether two partitions share at least one value
    pub fn overlaps(&self, other: &Partition) -> bool {
        let self_below_other = self.max.is_some_and(|max| max < other.min);
        let other_below_self = other.max.is_some_and(|max| max < self.min);
        !(self_below_other || other_below_self)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{},{}", self.min, max),
            None => write!(f, "{},", self.min),
        }
    }
}

impl Serialize for Partition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The built-in partition set, in its documented order
pub fn default_partitions() -> Vec<Partition> {
    DEFAULT_PARTITIONS
        .iter()
        .map(|&(min, max)| Partition { min, max })
        .collect()
}

/// Normalize caller descriptors into partitions, preserving input order.
///
/// An empty descriptor list selects [`default_partitions`]. Malformed entries
/// are dropped individually; a list where every entry is malformed yields no
/// partitions.
pub fn normalize_ranges(descriptors: &[Value]) -> Vec<Partition> {
    if descriptors.is_empty() {
        debug!("No partition ranges supplied, using default partition set");
        return default_partitions();
    }

    let partitions: Vec<Partition> = descriptors
        .iter()
        .filter_map(|descriptor| {
            let parsed = parse_descriptor(descriptor);
            if parsed.is_none() {
                warn!(descriptor = %descriptor, "Dropping malformed partition range");
            }
            parsed
        })
        .collect();

    for (i, a) in partitions.iter().enumerate() {
        for b in &partitions[i + 1..] {
            if a.overlaps(b) {
                debug!(first = %a, second = %b, "Caller supplied overlapping partitions");
            }
        }
    }

    partitions
}

/// Parse a single descriptor in any accepted shape
pub fn parse_descriptor(descriptor: &Value) -> Option<Partition> {
    match descriptor {
        Value::String(text) => parse_delimited(text),
        Value::Array(items) if items.len() == 2 => {
            let min = bound_value(&items[0])??;
            let max = bound_value(&items[1])?;
            Partition::new(min, max)
        }
        Value::Object(map) => {
            let min = bound_value(map.get("min")?)??;
            let max = match map.get("max") {
                Some(value) => bound_value(value)?,
                None => None,
            };
            Partition::new(min, max)
        }
        _ => None,
    }
}

fn parse_delimited(text: &str) -> Option<Partition> {
    let text = text.trim();

    if let Some(min) = text.strip_suffix('+') {
        return Partition::new(parse_number(min)?, None);
    }

    let (min, max) = text.split_once(&[',', '-', ':'][..])?;
    let min = parse_number(min)?;
    let max = if max.trim().is_empty() {
        None
    } else {
        Some(parse_number(max)?)
    };
    Partition::new(min, max)
}

/// Outer `None` means malformed; inner `None` means an explicit open bound.
fn bound_value(value: &Value) -> Option<Option<u64>> {
    match value {
        Value::Null => Some(None),
        Value::Number(n) => n.as_u64().map(Some),
        Value::String(s) => parse_number(s).map(Some),
        _ => None,
    }
}

fn parse_number(text: &str) -> Option<u64> {
    text.trim().parse::<u64>().ok()
}
