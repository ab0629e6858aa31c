//! Semantic cache store trait and types

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// A previously answered question with its embedding and serialized answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticCacheEntry {
    id: String,
    question: String,
    embedding: Vec<f32>,
    /// Serialized answer, decoded only on a hit
    payload: String,
    created_at: DateTime<Utc>,
}

impl SemanticCacheEntry {
    pub fn new(question: impl Into<String>, embedding: Vec<f32>, payload: impl Into<String>) -> Self {
        Self {
            id: format!("sem:{}", Uuid::new_v4()),
            question: question.into(),
            embedding,
            payload: payload.into(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Decode the stored payload
    pub fn deserialize_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, DomainError> {
        serde_json::from_str(&self.payload).map_err(|e| {
            DomainError::cache(format!("Failed to deserialize cached payload: {}", e))
        })
    }
}

/// Result of a semantic cache search
#[derive(Debug, Clone)]
pub struct SemanticSearchResult {
    pub entry: SemanticCacheEntry,
    pub similarity: f32,
}

impl SemanticSearchResult {
    pub fn new(entry: SemanticCacheEntry, similarity: f32) -> Self {
        Self { entry, similarity }
    }
}

/// Search parameters for semantic cache lookup
#[derive(Debug, Clone)]
pub struct SemanticSearchParams {
    /// Minimum similarity, inclusive
    pub min_similarity: f32,
    pub limit: usize,
}

impl Default for SemanticSearchParams {
    fn default() -> Self {
        Self {
            min_similarity: 0.75,
            limit: 1,
        }
    }
}

impl SemanticSearchParams {
    pub fn new(min_similarity: f32) -> Self {
        Self {
            min_similarity,
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Insertion-ordered vector store for semantic cache entries
///
/// Results are sorted by similarity descending; equal scores keep
/// insertion order, so the earliest entry wins a tie.
#[async_trait]
pub trait SemanticCache: Send + Sync + Debug {
    /// Entries with similarity >= `params.min_similarity`, best first
    async fn search(
        &self,
        embedding: &[f32],
        params: &SemanticSearchParams,
    ) -> Result<Vec<SemanticSearchResult>, DomainError>;

    /// Nearest entry meeting the threshold
    async fn find_similar(
        &self,
        embedding: &[f32],
        params: &SemanticSearchParams,
    ) -> Result<Option<SemanticSearchResult>, DomainError> {
        let params = params.clone().with_limit(1);
        let results = self.search(embedding, &params).await?;
        Ok(results.into_iter().next())
    }

    /// Append a new entry; existing entries are never updated in place
    async fn store(&self, entry: SemanticCacheEntry) -> Result<(), DomainError>;

    /// Get the number of entries
    async fn size(&self) -> Result<usize, DomainError>;
}
