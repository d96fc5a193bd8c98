//! Append-only versioned content store.
//!
//! Holds generated lesson artifacts (summary, flashcards, exercises, exam,
//! ...) as ordered version histories per category. This is a consumer of the
//! pipeline's output, not a dependency of it: the downstream agent writes
//! regenerated content here and reads back the latest version.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One stored version of a content category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentVersion {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub data: serde_json::Value,
}

/// Thread-safe in-memory version history keyed by content category.
///
/// Histories are append-only: versions are never edited or removed, and
/// `get_latest` always returns the most recently added entry.
#[derive(Debug, Default)]
pub struct VersionStore {
    inner: Mutex<HashMap<String, Vec<ContentVersion>>>,
}

impl VersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new version under `category` and return it.
    pub fn add_version(&self, category: &str, data: serde_json::Value) -> ContentVersion {
        let version = ContentVersion {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            data,
        };
        self.inner
            .lock()
            .entry(category.to_string())
            .or_default()
            .push(version.clone());
        version
    }

    /// Latest version for `category`, or None if nothing was added yet.
    pub fn get_latest(&self, category: &str) -> Option<ContentVersion> {
        self.inner
            .lock()
            .get(category)
            .and_then(|history| history.last().cloned())
    }

    /// Number of versions stored under `category`.
    pub fn version_count(&self, category: &str) -> usize {
        self.inner
            .lock()
            .get(category)
            .map(|history| history.len())
            .unwrap_or(0)
    }
}
