//! End-to-end pipeline tests against an in-memory index and a fake
//! embedding provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use lessonloom_core::{Error, RawDocument, Result};
use lessonloom_embed::{BatchLimits, EmbeddingClient, EmbeddingProvider, RateLimiter};
use lessonloom_index::{MemoryVectorIndex, VectorIndexAdapter};
use lessonloom_pipeline::IngestPipeline;

const DIM: usize = 8;

/// Deterministic provider: each vector encodes the input's length, so tests
/// can verify position pairing.
struct FakeProvider {
    calls: AtomicUsize,
    fail: bool,
}

impl FakeProvider {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Provider("provider unavailable".into()));
        }
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![1.0f32; DIM];
                v[0] = t.chars().count() as f32;
                v
            })
            .collect())
    }
}

struct Harness {
    pipeline: IngestPipeline,
    provider: Arc<FakeProvider>,
    index: Arc<MemoryVectorIndex>,
}

fn harness(provider: FakeProvider, rate_limit: usize) -> Harness {
    let provider = Arc::new(provider);
    let index = Arc::new(MemoryVectorIndex::new());

    let embedder = EmbeddingClient::new(
        provider.clone(),
        BatchLimits {
            max_batch_items: 512,
            max_item_chars: 1000,
            request_batch_size: 100,
        },
        DIM,
    )
    .expect("valid batch limits");
    let limiter = Arc::new(RateLimiter::new(rate_limit, Duration::from_secs(60)));
    let adapter = VectorIndexAdapter::new(index.clone());

    let pipeline = IngestPipeline::new(1000, 200, limiter, embedder, adapter)
        .expect("valid pipeline config");
    Harness {
        pipeline,
        provider,
        index,
    }
}

fn doc(text: impl Into<String>, owner: &str, source: &str) -> RawDocument {
    RawDocument {
        text: text.into(),
        owner_id: owner.into(),
        source_id: source.into(),
    }
}

#[tokio::test]
async fn test_2500_chars_become_three_records_for_owner_42() {
    let h = harness(FakeProvider::new(), 10);
    let text = "abcde".repeat(500); // 2500 chars, no whitespace: hard cuts

    let summary = h
        .pipeline
        .ingest(doc(text, "owner-42", "lesson-7"))
        .await
        .unwrap();

    assert_eq!(summary.chunk_count, 3);
    assert_eq!(h.index.record_count("owner-42"), 3);

    // Every record carries a vector of the configured dimension, and the
    // length marker pairs each chunk with its own vector (1000, 1000, 900).
    let hits = h
        .pipeline
        .retrieve("owner-42", "abcde", 10)
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);

    let mut stored: Vec<(usize, f32)> = hits
        .iter()
        .map(|hit| {
            let record = h.index.get("owner-42", &hit.id).unwrap();
            assert_eq!(record.vector.len(), DIM);
            let idx = record.metadata.as_ref().unwrap()["chunkIndex"]
                .as_u64()
                .unwrap() as usize;
            (idx, record.vector[0])
        })
        .collect();
    stored.sort_by_key(|(idx, _)| *idx);
    assert_eq!(stored[0].1, 1000.0);
    assert_eq!(stored[1].1, 1000.0);
    assert_eq!(stored[2].1, 900.0);
}

#[tokio::test]
async fn test_reingest_is_idempotent() {
    let h = harness(FakeProvider::new(), 10);
    let text = "lorem ipsum dolor sit amet ".repeat(80);

    let first = h
        .pipeline
        .ingest(doc(text.clone(), "owner-1", "lesson-1"))
        .await
        .unwrap();
    let count_after_first = h.index.record_count("owner-1");

    let second = h
        .pipeline
        .ingest(doc(text, "owner-1", "lesson-1"))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(h.index.record_count("owner-1"), count_after_first);
}

#[tokio::test]
async fn test_owners_are_isolated_end_to_end() {
    let h = harness(FakeProvider::new(), 10);

    h.pipeline
        .ingest(doc("alpha notes about electricity", "owner-a", "lesson-1"))
        .await
        .unwrap();
    h.pipeline
        .ingest(doc("beta notes about magnetism", "owner-b", "lesson-1"))
        .await
        .unwrap();

    let a_hits = h.pipeline.retrieve("owner-a", "notes", 10).await.unwrap();
    let b_hits = h.pipeline.retrieve("owner-b", "notes", 10).await.unwrap();

    assert!(a_hits.iter().all(|hit| hit.text.contains("alpha")));
    assert!(b_hits.iter().all(|hit| hit.text.contains("beta")));
}

#[tokio::test]
async fn test_provider_failure_writes_nothing() {
    let h = harness(FakeProvider::failing(), 10);

    let err = h
        .pipeline
        .ingest(doc("some lesson text", "owner-1", "lesson-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Provider(_)));
    assert_eq!(h.index.record_count("owner-1"), 0);
}

#[tokio::test]
async fn test_rate_limit_rejects_before_embedding() {
    let h = harness(FakeProvider::new(), 1);

    h.pipeline
        .ingest(doc("first document", "owner-1", "lesson-1"))
        .await
        .unwrap();
    let calls_after_first = h.provider.calls();

    let err = h
        .pipeline
        .ingest(doc("second document", "owner-1", "lesson-2"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RateLimited { .. }));
    // The rejected call never reached the provider.
    assert_eq!(h.provider.calls(), calls_after_first);
    assert_eq!(h.index.record_count("owner-1"), 1);

    // A different owner still has quota.
    h.pipeline
        .ingest(doc("other tenant", "owner-2", "lesson-1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_empty_text_short_circuits() {
    let h = harness(FakeProvider::new(), 10);

    let summary = h
        .pipeline
        .ingest(doc("   \n\n  ", "owner-1", "lesson-1"))
        .await
        .unwrap();

    assert_eq!(summary.chunk_count, 0);
    assert_eq!(h.provider.calls(), 0);
    assert_eq!(h.index.record_count("owner-1"), 0);
}

#[tokio::test]
async fn test_cleaning_feeds_the_chunker() {
    let h = harness(FakeProvider::new(), 10);

    let summary = h
        .pipeline
        .ingest(doc(
            "Ohm's law:\n\n•voltage equals\ncurrent  times resistance",
            "owner-1",
            "lesson-1",
        ))
        .await
        .unwrap();
    assert_eq!(summary.chunk_count, 1);

    let hits = h.pipeline.retrieve("owner-1", "ohm", 1).await.unwrap();
    assert_eq!(
        hits[0].text,
        "Ohm's law: • voltage equals current times resistance"
    );
}
