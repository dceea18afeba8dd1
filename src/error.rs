//! # Search Error Types
//!
//! Request-level failures abort a whole search; fetch failures are scoped to a
//! single partition and end up recorded on that partition's outcome.

use serde_json::Value;
use thiserror::Error;

use crate::constants::status_codes;

/// Search operation result type
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors fatal to a whole top-level search
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Translation failed: {0}")]
    Translation(#[from] TranslationError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SearchError {
    /// Create a request validation error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

impl From<config::ConfigError> for SearchError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Errors raised by a single remote search call
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// Create an HTTP error from a non-success response
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Status code recorded on a failed partition outcome
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            FetchError::Http { status, .. } => *status,
            FetchError::Timeout { .. } => status_codes::GATEWAY_TIMEOUT,
            FetchError::Transport(_) | FetchError::InvalidResponse(_) => status_codes::BAD_GATEWAY,
        }
    }

    /// Diagnostic detail recorded on a failed partition outcome.
    ///
    /// HTTP bodies that parse as JSON are passed through structurally so callers
    /// can read the remote API's machine-readable error fields.
    #[must_use]
    pub fn error_detail(&self) -> Value {
        match self {
            FetchError::Http { body, .. } => {
                serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.clone()))
            }
            other => Value::String(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::InvalidResponse(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// The translator could not produce a usable structured query
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TranslationError {
    pub message: String,
}

impl TranslationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Record enrichment failed; swallowed by best-effort enrichment
#[derive(Debug, Clone, Error)]
#[error("Enrichment failed: {0}")]
pub struct EnrichmentError(pub String);
