//! LessonLoom Pipeline — the ingestion orchestrator.
//!
//! Composes cleaner, chunker, rate limiter, embedding client and the tenant
//! namespace adapter into one `ingest` call: source text in, queryable
//! vectors out.

pub mod ingest;

pub use ingest::{chunk_id, IngestPipeline};
