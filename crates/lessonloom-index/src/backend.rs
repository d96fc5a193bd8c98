//! Vector storage backends.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use lessonloom_core::{IndexedRecord, Result, ScoredRecord};

/// A vector database addressed by namespace.
///
/// Upsert is insert-or-replace by record id: re-writing an id updates the
/// stored vector/text/metadata and never duplicates. Namespaces are hard
/// partitions; a query only ever sees records written to the same namespace.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Write `records` into `namespace`, returning the count written.
    async fn upsert(&self, namespace: &str, records: &[IndexedRecord]) -> Result<usize>;

    /// Return the `top_k` records in `namespace` most similar to `vector`.
    async fn query(&self, namespace: &str, vector: &[f32], top_k: usize)
        -> Result<Vec<ScoredRecord>>;
}

/// In-memory backend for tests and local development.
///
/// Mirrors the external store's semantics: per-namespace id maps, cosine
/// similarity scoring.
#[derive(Default)]
pub struct MemoryVectorIndex {
    namespaces: RwLock<HashMap<String, HashMap<String, IndexedRecord>>>,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored in `namespace`.
    pub fn record_count(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .get(namespace)
            .map(|records| records.len())
            .unwrap_or(0)
    }

    /// Fetch a stored record by id, if present.
    pub fn get(&self, namespace: &str, id: &str) -> Option<IndexedRecord> {
        self.namespaces
            .read()
            .get(namespace)
            .and_then(|records| records.get(id).cloned())
    }
}

#[async_trait]
impl VectorBackend for MemoryVectorIndex {
    async fn upsert(&self, namespace: &str, records: &[IndexedRecord]) -> Result<usize> {
        let mut namespaces = self.namespaces.write();
        let slot = namespaces.entry(namespace.to_string()).or_default();
        for record in records {
            slot.insert(record.id.clone(), record.clone());
        }
        Ok(records.len())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>> {
        let namespaces = self.namespaces.read();
        let Some(records) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<ScoredRecord> = records
            .values()
            .map(|r| ScoredRecord {
                id: r.id.clone(),
                score: cosine_similarity(&r.vector, vector),
                text: r.text.clone(),
                metadata: r.metadata.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
