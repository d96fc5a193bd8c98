//! LessonLoom Ingest — text normalization and overlap chunking.

pub mod chunking;
pub mod clean;

pub use chunking::{split_chunks, validate_chunk_params, ChunkSpan};
pub use clean::clean;
