//! Data types flowing through the ingestion pipeline.

use serde::{Deserialize, Serialize};

/// Raw source text handed to the pipeline by an upstream extractor.
///
/// Transient: consumed once per `ingest` call, never stored as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    pub text: String,
    /// Tenant that owns the document. Drives namespace routing.
    pub owner_id: String,
    /// Originating lesson/session identifier.
    pub source_id: String,
}

/// Character-range position of a chunk within its cleaned source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPosition {
    pub index: usize,
    pub char_start: usize,
    pub char_end: usize,
}

/// A contiguous span of cleaned text prepared for embedding.
///
/// Chunks are created by the chunker and never mutated afterwards; each
/// belongs to exactly one source document and one owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable content-addressed identifier.
    pub id: String,
    pub text: String,
    pub position: ChunkPosition,
    pub owner_id: String,
    pub source_id: String,
}

/// The persisted unit in the vector store, written into the owner's
/// namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// A record returned from a similarity query, with the backend's score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: String,
    pub score: f32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Completion summary reported by one `ingest` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub chunk_count: usize,
}
