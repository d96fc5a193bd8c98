//! Batch validation and partitioning in front of an embedding provider.

use std::sync::Arc;

use tracing::debug;

use lessonloom_core::{Error, Result};

use crate::provider::EmbeddingProvider;

/// Size constraints enforced before any provider call.
#[derive(Debug, Clone, Copy)]
pub struct BatchLimits {
    /// Maximum items accepted by one `embed` call.
    pub max_batch_items: usize,
    /// Maximum chars per item.
    pub max_item_chars: usize,
    /// Items sent per provider request.
    pub request_batch_size: usize,
}

/// Order-preserving embedding front end.
///
/// Validates the whole input against `BatchLimits` up front, then issues
/// provider-sized sub-batches sequentially and concatenates the results.
/// Any provider failure or count/dimension mismatch rejects the entire
/// call; callers never see a partial vector list, so chunk-to-vector
/// pairing by position cannot desynchronize.
pub struct EmbeddingClient {
    provider: Arc<dyn EmbeddingProvider>,
    limits: BatchLimits,
    dimension: usize,
}

impl std::fmt::Debug for EmbeddingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingClient")
            .field("limits", &self.limits)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl EmbeddingClient {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        limits: BatchLimits,
        dimension: usize,
    ) -> Result<Self> {
        if limits.request_batch_size == 0 {
            return Err(Error::Validation(
                "request_batch_size must be positive".into(),
            ));
        }
        Ok(Self {
            provider,
            limits,
            dimension,
        })
    }

    /// Embedding dimension this client is configured for.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Size constraints this client enforces.
    pub fn limits(&self) -> BatchLimits {
        self.limits
    }

    /// Embed `texts`, one vector per input, in input order.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.len() > self.limits.max_batch_items {
            return Err(Error::Validation(format!(
                "batch of {} items exceeds max_batch_items ({})",
                texts.len(),
                self.limits.max_batch_items
            )));
        }
        for (i, text) in texts.iter().enumerate() {
            let len = text.chars().count();
            if len > self.limits.max_item_chars {
                return Err(Error::Validation(format!(
                    "item {i} has {len} chars, exceeds max_item_chars ({})",
                    self.limits.max_item_chars
                )));
            }
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.limits.request_batch_size) {
            let returned = self.provider.embed(batch).await?;
            if returned.len() != batch.len() {
                return Err(Error::Provider(format!(
                    "provider returned {} vectors for {} inputs",
                    returned.len(),
                    batch.len()
                )));
            }
            if let Some(bad) = returned.iter().find(|v| v.len() != self.dimension) {
                return Err(Error::Provider(format!(
                    "provider returned a {}-dim vector, expected {}",
                    bad.len(),
                    self.dimension
                )));
            }
            vectors.extend(returned);
        }

        debug!(count = vectors.len(), "embedded batch");
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic provider that counts calls and tags vectors with the
    /// input's position, so order survives concatenation checks.
    struct FakeProvider {
        dimension: usize,
        calls: AtomicUsize,
        /// When set, return this many vectors regardless of input size.
        force_count: Option<usize>,
    }

    impl FakeProvider {
        fn new(dimension: usize) -> Self {
            Self {
                dimension,
                calls: AtomicUsize::new(0),
                force_count: None,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FakeProvider {
        async fn embed(&self, texts: &[String]) -> lessonloom_core::Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let count = self.force_count.unwrap_or(texts.len());
            Ok((0..count)
                .map(|_| vec![0.5f32; self.dimension])
                .collect())
        }
    }

    fn limits() -> BatchLimits {
        BatchLimits {
            max_batch_items: 8,
            max_item_chars: 10,
            request_batch_size: 3,
        }
    }

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("text-{i}")).collect()
    }

    #[tokio::test]
    async fn test_partitions_into_sub_batches_preserving_count() {
        let provider = Arc::new(FakeProvider::new(4));
        let client = EmbeddingClient::new(provider.clone(), limits(), 4).unwrap();

        let vectors = client.embed(&texts(7)).await.unwrap();
        assert_eq!(vectors.len(), 7);
        assert!(vectors.iter().all(|v| v.len() == 4));
        // 7 items at request_batch_size 3 -> 3 provider calls
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_oversized_batch_fails_before_any_call() {
        let provider = Arc::new(FakeProvider::new(4));
        let client = EmbeddingClient::new(provider.clone(), limits(), 4).unwrap();

        let err = client.embed(&texts(9)).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("max_batch_items"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_item_fails_before_any_call() {
        let provider = Arc::new(FakeProvider::new(4));
        let client = EmbeddingClient::new(provider.clone(), limits(), 4).unwrap();

        let mut input = texts(3);
        input[1] = "x".repeat(11);
        let err = client.embed(&input).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("max_item_chars"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_count_mismatch_rejects_whole_batch() {
        let mut provider = FakeProvider::new(4);
        provider.force_count = Some(2);
        let client = EmbeddingClient::new(Arc::new(provider), limits(), 4).unwrap();

        let err = client.embed(&texts(3)).await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejects_whole_batch() {
        let provider = Arc::new(FakeProvider::new(4));
        let client = EmbeddingClient::new(provider, limits(), 6).unwrap();

        let err = client.embed(&texts(2)).await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[test]
    fn test_zero_request_batch_size_is_rejected() {
        let provider = Arc::new(FakeProvider::new(4));
        let mut bad = limits();
        bad.request_batch_size = 0;

        let err = EmbeddingClient::new(provider, bad, 4).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("request_batch_size"));
    }

    #[tokio::test]
    async fn test_empty_input_is_a_no_op() {
        let provider = Arc::new(FakeProvider::new(4));
        let client = EmbeddingClient::new(provider.clone(), limits(), 4).unwrap();

        assert!(client.embed(&[]).await.unwrap().is_empty());
        assert_eq!(provider.calls(), 0);
    }
}
