//! Exact-match answer cache trait

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use super::CacheKey;
use crate::domain::DomainError;

/// Durable key/value store for answers
///
/// This trait uses JSON strings internally to be dyn-compatible.
/// Use [`AnswerCacheExt`] for typed get/set operations.
#[async_trait]
pub trait AnswerCache: Send + Sync + Debug {
    /// Gets a raw JSON value from the cache
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Sets a raw JSON value, replacing any previous value for the key
    async fn set_raw(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Returns number of entries in the cache
    async fn size(&self) -> Result<usize, DomainError>;

    /// Backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Extension trait providing typed get/set operations keyed by [`CacheKey`]
pub trait AnswerCacheExt: AnswerCache {
    fn get<'a, V>(
        &'a self,
        key: &'a CacheKey,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(&key.to_string()).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cache value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    fn set<'a, V>(
        &'a self,
        key: &'a CacheKey,
        value: &'a V,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cache value: {}", e))
            })?;
            self.set_raw(&key.to_string(), &data).await
        }
    }
}

impl<T: AnswerCache + ?Sized> AnswerCacheExt for T {}
