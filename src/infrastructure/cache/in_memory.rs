//! In-memory answer cache using moka

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::cache::AnswerCache;
use crate::domain::DomainError;

/// Process-local answer cache; contents are lost on exit
#[derive(Debug)]
pub struct InMemoryAnswerCache {
    cache: MokaCache<String, String>,
}

impl InMemoryAnswerCache {
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            cache: MokaCache::builder().max_capacity(max_capacity).build(),
        }
    }
}

impl Default for InMemoryAnswerCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerCache for InMemoryAnswerCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.cache.get(key).await)
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        self.cache.run_pending_tasks().await;
        Ok(self.cache.entry_count() as usize)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::answer::AnswerResult;
    use crate::domain::cache::{AnswerCacheExt, CacheKey};

    #[tokio::test]
    async fn test_typed_round_trip() {
        let cache = InMemoryAnswerCache::new();
        let key = CacheKey::quote_only("How do I build a Date?", 5);
        let answer = AnswerResult::new("How do I build a Date?", "ql.Date(15, 6, 2020)", vec![]);

        cache.set(&key, &answer).await.unwrap();
        let cached: Option<AnswerResult> = cache.get(&key).await.unwrap();

        assert_eq!(cached.unwrap().answer_text, "ql.Date(15, 6, 2020)");
        assert_eq!(cache.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cache = InMemoryAnswerCache::new();

        assert_eq!(cache.get_raw("nope").await.unwrap(), None);
        assert_eq!(cache.size().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_single_entry() {
        let cache = InMemoryAnswerCache::new();

        cache.set_raw("k", "\"a\"").await.unwrap();
        cache.set_raw("k", "\"b\"").await.unwrap();

        assert_eq!(cache.get_raw("k").await.unwrap().as_deref(), Some("\"b\""));
        assert_eq!(cache.size().await.unwrap(), 1);
    }

    #[test]
    fn test_normalized_questions_share_entry() {
        let cache = InMemoryAnswerCache::new();
        let answer = AnswerResult::no_context("What is a swaption?");

        let cached: Option<AnswerResult> = tokio_test::block_on(async {
            cache
                .set(&CacheKey::quote_only("What is a swaption?", 5), &answer)
                .await
                .unwrap();
            cache
                .get(&CacheKey::quote_only("  what IS a swaption ?! ", 5))
                .await
                .unwrap()
        });

        assert_eq!(cached, Some(answer));
    }
}
