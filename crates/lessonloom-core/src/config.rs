//! Environment-driven configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
/// Hard cap on items accepted by one `embed` call.
pub const DEFAULT_MAX_BATCH_ITEMS: usize = 512;
/// Hard cap on the character length of a single embedding input.
pub const DEFAULT_MAX_ITEM_CHARS: usize = 1000;
/// Items sent to the provider per HTTP request.
pub const DEFAULT_REQUEST_BATCH_SIZE: usize = 100;

/// Top-level LessonLoom configuration, read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoomConfig {
    /// Embedding provider endpoint (e.g. `https://api.example.com/v1`).
    pub provider_url: String,
    /// Bearer token for the embedding provider.
    pub provider_api_key: String,
    /// Vector database endpoint.
    pub index_url: String,
    /// Bearer token for the vector database.
    pub index_api_key: String,
    /// Logical index name within the vector database.
    pub index_name: String,
    /// Embedding dimension the provider is configured for.
    pub embedding_dim: usize,
    /// Maximum items accepted by one embed call.
    pub max_batch_items: usize,
    /// Maximum characters per embedding input.
    pub max_item_chars: usize,
    /// Items per provider HTTP request.
    pub request_batch_size: usize,
    /// Requests allowed per caller within one rate-limit window.
    pub rate_limit: usize,
    /// Rate-limit window in milliseconds.
    pub rate_limit_window_ms: u64,
    /// Chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks, in characters.
    pub chunk_overlap: usize,
}

impl LoomConfig {
    /// Build configuration from environment variables and defaults.
    ///
    /// `LOOM_PROVIDER_URL`, `LOOM_PROVIDER_API_KEY`, `LOOM_INDEX_URL` and
    /// `LOOM_INDEX_NAME` are required; everything else falls back to the
    /// module defaults.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            provider_url: require_env("LOOM_PROVIDER_URL")?,
            provider_api_key: require_env("LOOM_PROVIDER_API_KEY")?,
            index_url: require_env("LOOM_INDEX_URL")?,
            index_api_key: std::env::var("LOOM_INDEX_API_KEY").unwrap_or_default(),
            index_name: require_env("LOOM_INDEX_NAME")?,
            embedding_dim: parse_env("LOOM_EMBEDDING_DIM", 1536)?,
            max_batch_items: parse_env("LOOM_MAX_BATCH_ITEMS", DEFAULT_MAX_BATCH_ITEMS)?,
            max_item_chars: parse_env("LOOM_MAX_ITEM_CHARS", DEFAULT_MAX_ITEM_CHARS)?,
            request_batch_size: parse_env("LOOM_REQUEST_BATCH_SIZE", DEFAULT_REQUEST_BATCH_SIZE)?,
            rate_limit: parse_env("LOOM_RATE_LIMIT", 20)?,
            rate_limit_window_ms: parse_env("LOOM_RATE_LIMIT_WINDOW_MS", 60_000)?,
            chunk_size: parse_env("LOOM_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: parse_env("LOOM_CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be positive".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.request_batch_size == 0 || self.request_batch_size > self.max_batch_items {
            return Err(Error::Config(format!(
                "request_batch_size ({}) must be in 1..={}",
                self.request_batch_size, self.max_batch_items
            )));
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| Error::Config(format!("missing required env var {key}")))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("invalid value for env var {key}: {raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> LoomConfig {
        LoomConfig {
            provider_url: "http://localhost:9000".into(),
            provider_api_key: "test-key".into(),
            index_url: "http://localhost:9001".into(),
            index_api_key: String::new(),
            index_name: "lessons".into(),
            embedding_dim: 8,
            max_batch_items: DEFAULT_MAX_BATCH_ITEMS,
            max_item_chars: DEFAULT_MAX_ITEM_CHARS,
            request_batch_size: DEFAULT_REQUEST_BATCH_SIZE,
            rate_limit: 20,
            rate_limit_window_ms: 60_000,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }

    #[test]
    fn test_valid_defaults() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_overlap_must_stay_below_chunk_size() {
        let mut config = base_config();
        config.chunk_overlap = config.chunk_size;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_request_batch_bounded_by_max_items() {
        let mut config = base_config();
        config.request_batch_size = config.max_batch_items + 1;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
