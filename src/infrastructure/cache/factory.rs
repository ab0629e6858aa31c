//! Answer cache factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::in_memory::InMemoryAnswerCache;
use super::json_file::JsonFileAnswerCache;
use crate::config::{ExactCacheBackend, ExactCacheConfig};
use crate::domain::cache::AnswerCache;

/// Factory for creating exact-match answer caches
#[derive(Debug)]
pub struct AnswerCacheFactory;

impl AnswerCacheFactory {
    pub fn create(config: &ExactCacheConfig) -> Arc<dyn AnswerCache> {
        let cache: Arc<dyn AnswerCache> = match config.backend {
            ExactCacheBackend::File => Arc::new(JsonFileAnswerCache::open(
                &config.path,
                Duration::from_millis(config.lock_timeout_ms),
            )),
            ExactCacheBackend::Memory => Arc::new(InMemoryAnswerCache::with_capacity(config.max_capacity)),
        };

        info!(backend = cache.backend_name(), "Answer cache ready");
        cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend() {
        let config = ExactCacheConfig {
            backend: ExactCacheBackend::Memory,
            ..ExactCacheConfig::default()
        };

        assert_eq!(AnswerCacheFactory::create(&config).backend_name(), "memory");
    }

    #[test]
    fn test_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExactCacheConfig {
            path: dir.path().join("cache.json").to_string_lossy().into_owned(),
            ..ExactCacheConfig::default()
        };

        assert_eq!(AnswerCacheFactory::create(&config).backend_name(), "json_file");
    }
}
