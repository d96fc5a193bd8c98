//! Error types for LessonLoom.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Caller-side input violation (batch/item size limits, bad parameters).
    /// Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Per-caller request quota exhausted; the caller should back off.
    #[error("Rate limit exceeded for caller '{caller_id}': {limit} requests per {window_ms}ms")]
    RateLimited {
        caller_id: String,
        limit: usize,
        window_ms: u64,
    },

    /// The embedding provider or vector store failed or returned malformed
    /// data. Safe to retry from the caller given idempotent upsert.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, Error>;
