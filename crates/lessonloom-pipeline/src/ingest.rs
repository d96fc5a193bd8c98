//! Ingestion orchestration: clean → chunk → rate-limit → embed → upsert.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use lessonloom_core::{
    Chunk, ChunkPosition, Error, IndexedRecord, IngestSummary, RawDocument, Result, ScoredRecord,
};
use lessonloom_embed::{EmbeddingClient, RateLimiter};
use lessonloom_index::VectorIndexAdapter;
use lessonloom_ingest::{clean, split_chunks, validate_chunk_params};

/// One ingestion pipeline instance, safe to share across concurrent calls.
///
/// The call fails atomically from the caller's perspective: any embedding or
/// upsert failure surfaces as an error with no partial-success claim. There
/// is no rollback of records already written; chunk ids are content-
/// addressed, so retrying the same input overwrites them in place.
pub struct IngestPipeline {
    chunk_size: usize,
    chunk_overlap: usize,
    limiter: Arc<RateLimiter>,
    embedder: EmbeddingClient,
    index: VectorIndexAdapter,
}

impl IngestPipeline {
    pub fn new(
        chunk_size: usize,
        chunk_overlap: usize,
        limiter: Arc<RateLimiter>,
        embedder: EmbeddingClient,
        index: VectorIndexAdapter,
    ) -> Result<Self> {
        validate_chunk_params(chunk_size, chunk_overlap)?;
        let max_item_chars = embedder.limits().max_item_chars;
        if chunk_size > max_item_chars {
            return Err(Error::Config(format!(
                "chunk_size ({chunk_size}) exceeds the embedder's max_item_chars ({max_item_chars})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            limiter,
            embedder,
            index,
        })
    }

    /// Run the full pipeline for one document.
    ///
    /// Empty (or whitespace-only) text yields a zero-chunk summary without
    /// touching the rate limiter or the network.
    pub async fn ingest(&self, raw: RawDocument) -> Result<IngestSummary> {
        let handle = self.index.attach_namespace(&raw.owner_id)?;

        let cleaned = clean(&raw.text);
        let spans = split_chunks(&cleaned, self.chunk_size, self.chunk_overlap);
        if spans.is_empty() {
            debug!(source_id = %raw.source_id, "nothing to ingest after cleaning");
            return Ok(IngestSummary { chunk_count: 0 });
        }

        self.limiter.check(&raw.owner_id)?;

        let chunks: Vec<Chunk> = spans
            .into_iter()
            .map(|span| Chunk {
                id: chunk_id(&raw.owner_id, &raw.source_id, span.index, &span.text),
                position: ChunkPosition {
                    index: span.index,
                    char_start: span.char_start,
                    char_end: span.char_end,
                },
                text: span.text,
                owner_id: raw.owner_id.clone(),
                source_id: raw.source_id.clone(),
            })
            .collect();

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;

        // Pair chunks and vectors strictly by position; the embedder
        // guarantees equal cardinality in input order.
        let records: Vec<IndexedRecord> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedRecord {
                id: chunk.id.clone(),
                vector,
                text: chunk.text.clone(),
                metadata: Some(serde_json::json!({
                    "sourceId": chunk.source_id,
                    "chunkIndex": chunk.position.index,
                    "charStart": chunk.position.char_start,
                    "charEnd": chunk.position.char_end,
                })),
            })
            .collect();

        let written = handle.upsert(&records).await?;
        info!(
            owner_id = %raw.owner_id,
            source_id = %raw.source_id,
            chunks = chunks.len(),
            written,
            "ingested document"
        );
        Ok(IngestSummary {
            chunk_count: chunks.len(),
        })
    }

    /// Retrieve the `top_k` stored chunks most similar to `query_text`,
    /// scoped to `owner_id`'s namespace.
    ///
    /// Shares the namespace derivation and rate limiting of `ingest`.
    pub async fn retrieve(
        &self,
        owner_id: &str,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>> {
        let handle = self.index.attach_namespace(owner_id)?;

        let cleaned = clean(query_text);
        if cleaned.is_empty() {
            return Err(Error::Validation("query text must not be empty".into()));
        }

        self.limiter.check(owner_id)?;

        let mut vectors = self.embedder.embed(std::slice::from_ref(&cleaned)).await?;
        let vector = vectors
            .pop()
            .ok_or_else(|| Error::Provider("provider returned no vector for query".into()))?;

        handle.query(&vector, top_k).await
    }
}

/// Content-addressed chunk id: identical input always maps to the same id,
/// which is what makes re-ingestion and retry-after-failure overwrite
/// instead of duplicate.
pub fn chunk_id(owner_id: &str, source_id: &str, index: usize, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(owner_id.as_bytes());
    hasher.update(b":");
    hasher.update(source_id.as_bytes());
    hasher.update(b":");
    hasher.update(index.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
