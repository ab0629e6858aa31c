//! In-memory semantic cache implementation

use std::collections::VecDeque;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::embedding::cosine_similarity;
use crate::domain::semantic_cache::{
    SemanticCache, SemanticCacheEntry, SemanticSearchParams, SemanticSearchResult,
};
use crate::domain::DomainError;

/// In-memory semantic cache using linear search
///
/// Entries are kept in insertion order. With `max_entries` set the oldest
/// entry is dropped once the capacity is reached; otherwise the store grows
/// without bound.
#[derive(Debug, Default)]
pub struct InMemorySemanticCache {
    entries: RwLock<VecDeque<SemanticCacheEntry>>,
    max_entries: Option<usize>,
}

impl InMemorySemanticCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: Option<usize>) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            max_entries: max_entries.filter(|max| *max > 0),
        }
    }

    /// Seed the store with entries in their original order
    pub fn from_entries(entries: Vec<SemanticCacheEntry>, max_entries: Option<usize>) -> Self {
        let cache = Self::with_max_entries(max_entries);
        {
            let mut guard = cache.entries.write().unwrap_or_else(|e| e.into_inner());
            for entry in entries {
                push_bounded(&mut guard, entry, cache.max_entries);
            }
        }
        cache
    }

    pub(super) fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Current entries, oldest first
    pub(super) fn snapshot(&self) -> Result<Vec<SemanticCacheEntry>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries.iter().cloned().collect())
    }
}

fn push_bounded(entries: &mut VecDeque<SemanticCacheEntry>, entry: SemanticCacheEntry, max: Option<usize>) {
    if let Some(max) = max {
        while entries.len() >= max {
            entries.pop_front();
        }
    }
    entries.push_back(entry);
}

/// Score entries against `embedding`, keep those at or above the threshold
/// and order them best first. The sort is stable so ties keep insertion order.
pub(super) fn rank<'a>(
    entries: impl Iterator<Item = &'a SemanticCacheEntry>,
    embedding: &[f32],
    params: &SemanticSearchParams,
) -> Vec<SemanticSearchResult> {
    let mut results: Vec<SemanticSearchResult> = entries
        .map(|entry| SemanticSearchResult::new(entry.clone(), cosine_similarity(embedding, entry.embedding())))
        .filter(|result| result.similarity >= params.min_similarity)
        .collect();

    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    results.truncate(params.limit);
    results
}

#[async_trait]
impl SemanticCache for InMemorySemanticCache {
    async fn search(
        &self,
        embedding: &[f32],
        params: &SemanticSearchParams,
    ) -> Result<Vec<SemanticSearchResult>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(rank(entries.iter(), embedding, params))
    }

    async fn store(&self, entry: SemanticCacheEntry) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        push_bounded(&mut entries, entry, self.max_entries);
        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries.len())
    }
}
