use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// One cached set of label names for a repository.
#[derive(Debug, Clone)]
pub struct CachedLabels {
    pub labels: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

/// In-memory label-suggestion cache keyed by "owner/repo".
///
/// Entries never expire on their own; they are replaced by a later fetch or
/// removed by an explicit eviction (the forced-refresh key). All access
/// happens on the event-loop thread, so no locking.
#[derive(Debug, Default)]
pub struct LabelCache {
    entries: HashMap<String, CachedLabels>,
}

impl LabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, repo_key: &str) -> Option<&CachedLabels> {
        self.entries.get(repo_key)
    }

    pub fn put(&mut self, repo_key: String, labels: Vec<String>) {
        self.entries.insert(
            repo_key,
            CachedLabels {
                labels,
                fetched_at: Utc::now(),
            },
        );
    }

    pub fn evict(&mut self, repo_key: &str) {
        self.entries.remove(repo_key);
    }
}
