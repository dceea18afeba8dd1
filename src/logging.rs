//! # Structured Logging Module
//!
//! Environment-aware structured logging for tracing partition fan-out across
//! concurrent workers.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| get_log_level(&environment));
        let json_output = std::env::var("PARTITION_SEARCH_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let console_layer = if json_output {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .with_filter(EnvFilter::new(&filter))
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_filter(EnvFilter::new(&filter))
                .boxed()
        };

        if tracing_subscriber::registry()
            .with(console_layer)
            .try_init()
            .is_err()
        {
            // Embedding applications may have installed their own subscriber
            tracing::debug!("Global tracing subscriber already initialized");
        }

        tracing::info!(
            environment = %environment,
            filter = %filter,
            json = json_output,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("PARTITION_SEARCH_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for a resolved partition
pub fn log_partition_operation(
    request_id: Uuid,
    partition: &str,
    status: &str,
    records: usize,
    pages: u32,
    elapsed_ms: u128,
    details: Option<&str>,
) {
    tracing::info!(
        request_id = %request_id,
        partition = %partition,
        status = %status,
        records = records,
        pages = pages,
        elapsed_ms = elapsed_ms as u64,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "PARTITION_OPERATION"
    );
}
