//! Explicit result cache keyed by project content.
//!
//! Callers own the cache; there is no process-wide state. A key is the
//! triple `(project_id, activity_count, content_hash)`, so any change to the
//! activity set misses naturally, and `invalidate_project` drops every
//! entry of a project at once after an edit.

use crate::activity::Activity;
use crate::checksum::content_hash;
use crate::error::CoreResult;
use std::collections::HashMap;

/// Key identifying one computed result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub project_id: String,
    pub activity_count: usize,
    pub content_hash: String,
}

impl CacheKey {
    /// Build the key for a project's current activity set.
    pub fn for_activities(project_id: impl Into<String>, activities: &[Activity]) -> CoreResult<Self> {
        Ok(Self {
            project_id: project_id.into(),
            activity_count: activities.len(),
            content_hash: content_hash(activities)?,
        })
    }
}

/// In-memory cache of computed results.
#[derive(Debug, Clone)]
pub struct ResultCache<V> {
    entries: HashMap<CacheKey, V>,
}

impl<V> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ResultCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<&V> {
        self.entries.get(key)
    }

    /// Store a result, returning the one it replaced.
    pub fn insert(&mut self, key: CacheKey, value: V) -> Option<V> {
        log::debug!(
            "Caching result for project '{}' ({} activities, hash {})",
            key.project_id,
            key.activity_count,
            key.content_hash
        );
        self.entries.insert(key, value)
    }

    pub fn invalidate(&mut self, key: &CacheKey) -> Option<V> {
        self.entries.remove(key)
    }

    /// Drop every entry of a project. Returns how many were removed.
    pub fn invalidate_project(&mut self, project_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.project_id != project_id);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
