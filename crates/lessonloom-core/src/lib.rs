//! LessonLoom Core — errors, configuration, shared pipeline types.

pub mod config;
pub mod error;
pub mod types;
pub mod versions;

pub use config::LoomConfig;
pub use error::{Error, Result};
pub use types::{Chunk, ChunkPosition, IndexedRecord, IngestSummary, RawDocument, ScoredRecord};
pub use versions::{ContentVersion, VersionStore};
