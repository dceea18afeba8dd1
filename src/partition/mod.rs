//! # Partitions
//!
//! Boundary normalization and per-partition query derivation.

pub mod query;
pub mod range;

pub use query::{PageRequest, SearchQuery};
pub use range::{default_partitions, normalize_ranges, parse_descriptor, Partition};
