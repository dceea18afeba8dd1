//! # Search Constants
//!
//! Field names, limits and the built-in partition set that define the
//! operational boundaries of the partitioned search engine.

/// Built-in headcount partitions used when a caller supplies no ranges.
///
/// Each entry is `(min, max)`; `None` marks the open-ended top range.
/// The order here is the order groups are returned in.
pub const DEFAULT_PARTITIONS: [(u64, Option<u64>); 8] = [
    (1, Some(10)),
    (11, Some(50)),
    (51, Some(200)),
    (201, Some(500)),
    (501, Some(1000)),
    (1001, Some(5000)),
    (5001, Some(10000)),
    (10001, None),
];

/// Remote search API request field names
pub mod fields {
    /// Partition range field written onto every derived query
    pub const PARTITION_RANGES: &str = "organization_num_employees_ranges";

    /// Nested sub-object some callers place the structured filters under
    pub const NESTED_QUERY: &str = "query";

    /// Requested page number (1-indexed)
    pub const PAGE: &str = "page";

    /// Requested page size
    pub const PER_PAGE: &str = "per_page";

    /// Global headcount boundaries that conflict with a partition range and are
    /// stripped from derived queries.
    pub const CONFLICTING_BOUNDARIES: &[&str] = &[
        "organization_num_employees_min",
        "organization_num_employees_max",
        "num_employees_min",
        "num_employees_max",
        "employee_count_min",
        "employee_count_max",
        "min_employees",
        "max_employees",
    ];
}

/// Engine limits and defaults
pub mod limits {
    /// Default number of partitions resolved concurrently
    pub const DEFAULT_CONCURRENCY: usize = 4;

    /// Largest page size the remote API accepts; used for exhaustive fetches
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Page size used when the caller does not ask for one
    pub const DEFAULT_PAGE_SIZE: u32 = 25;

    /// Upper bound on pages walked for one partition in an exhaustive fetch
    pub const MAX_PAGES_PER_PARTITION: u32 = 500;

    /// Per-call timeout for remote search requests
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

    /// Concurrent enrichment lookups per aggregate
    pub const ENRICHMENT_CONCURRENCY: usize = 4;
}

/// Status codes reported on failed outcomes that did not carry an HTTP status
pub mod status_codes {
    /// Remote call exceeded its timeout
    pub const GATEWAY_TIMEOUT: u16 = 504;

    /// Transport failure or unreadable response from the remote API
    pub const BAD_GATEWAY: u16 = 502;

    /// Exhaustive fetch stopped at the configured page limit
    pub const PARTIAL_CONTENT: u16 = 206;
}
