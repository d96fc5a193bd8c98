//! Tenant namespace derivation and scoped index handles.

use std::sync::Arc;

use tracing::debug;

use lessonloom_core::{Error, IndexedRecord, Result, ScoredRecord};

use crate::backend::VectorBackend;

/// The only place a namespace is derived from an owner id.
///
/// Both ingestion and retrieval attach through here, so the two can never
/// disagree about which partition a tenant's records live in. Nothing else
/// in the workspace passes a raw namespace string to a backend.
pub struct VectorIndexAdapter {
    backend: Arc<dyn VectorBackend>,
}

impl VectorIndexAdapter {
    pub fn new(backend: Arc<dyn VectorBackend>) -> Self {
        Self { backend }
    }

    /// Attach to the namespace owned by `owner_id`.
    pub fn attach_namespace(&self, owner_id: &str) -> Result<NamespaceHandle> {
        if owner_id.trim().is_empty() {
            return Err(Error::Validation("owner_id must not be empty".into()));
        }
        // The namespace string is the owner id itself; isolation is
        // structural, not filter-based.
        Ok(NamespaceHandle {
            backend: self.backend.clone(),
            namespace: owner_id.to_string(),
        })
    }
}

/// A backend handle locked to one tenant's namespace.
pub struct NamespaceHandle {
    backend: Arc<dyn VectorBackend>,
    namespace: String,
}

impl NamespaceHandle {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Insert-or-replace `records` in this tenant's namespace.
    pub async fn upsert(&self, records: &[IndexedRecord]) -> Result<usize> {
        let written = self.backend.upsert(&self.namespace, records).await?;
        debug!(namespace = %self.namespace, written, "upserted records");
        Ok(written)
    }

    /// Similarity query scoped to this tenant's namespace.
    pub async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>> {
        self.backend.query(&self.namespace, vector, top_k).await
    }
}
