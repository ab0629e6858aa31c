use std::fmt::Debug;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::RetrievedPassage;
use crate::domain::DomainError;

/// Ranked passage lookup over an externally built index
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Retriever: Send + Sync + Debug {
    /// Return at most `k` passages, best first
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>, DomainError>;
}
