//! Approximate answer lookup by question embedding
//!
//! A stored answer is reused when the new question's embedding is at least
//! `similarity_threshold` cosine-similar to a previously answered one.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::answer::AnswerResult;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::semantic_cache::{
    SemanticCache, SemanticCacheConfig, SemanticCacheEntry, SemanticSearchParams,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_semantic_cache, CacheOutcome};

#[derive(Debug)]
pub struct SemanticAnswerCache {
    store: Arc<dyn SemanticCache>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: SemanticCacheConfig,
}

impl SemanticAnswerCache {
    pub fn new(store: Arc<dyn SemanticCache>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self::with_config(store, embedder, SemanticCacheConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn SemanticCache>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: SemanticCacheConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn threshold(&self) -> f32 {
        self.config.threshold()
    }

    /// Nearest stored answer meeting the threshold
    ///
    /// Embedding, search or decoding failures are logged and reported as a miss.
    pub async fn get(&self, question: &str) -> Option<AnswerResult> {
        if !self.config.enabled {
            return None;
        }

        let embedding = match self.embedder.embed_text(question.trim()).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Failed to embed question for semantic lookup: {}", e);
                record_semantic_cache(CacheOutcome::Error);
                return None;
            }
        };

        let params = SemanticSearchParams::new(self.threshold());
        let found = match self.store.find_similar(&embedding, &params).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Semantic cache search failed: {}", e);
                record_semantic_cache(CacheOutcome::Error);
                return None;
            }
        };

        let Some(hit) = found else {
            debug!(threshold = self.threshold(), "Semantic cache miss");
            record_semantic_cache(CacheOutcome::Miss);
            return None;
        };

        match hit.entry.deserialize_payload::<AnswerResult>() {
            Ok(answer) => {
                debug!(
                    similarity = hit.similarity,
                    entry = hit.entry.id(),
                    matched_question = hit.entry.question(),
                    "Semantic cache hit"
                );
                record_semantic_cache(CacheOutcome::Hit);
                Some(answer)
            }
            Err(e) => {
                warn!(entry = hit.entry.id(), "Unreadable semantic cache payload: {}", e);
                record_semantic_cache(CacheOutcome::Error);
                None
            }
        }
    }

    /// Store an answer under the question's embedding
    pub async fn set(&self, question: &str, answer: &AnswerResult) -> Result<(), DomainError> {
        if !self.config.enabled {
            return Ok(());
        }

        let question = question.trim();
        let embedding = self.embedder.embed_text(question).await?;
        let payload = serde_json::to_string(answer)
            .map_err(|e| DomainError::cache(format!("Failed to serialize answer: {}", e)))?;

        self.store
            .store(SemanticCacheEntry::new(question, embedding, payload))
            .await
    }

    pub async fn size(&self) -> Result<usize, DomainError> {
        self.store.size().await
    }
}
