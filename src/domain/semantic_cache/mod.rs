//! Semantic (embedding-based) cache domain

mod config;
mod repository;

pub use config::SemanticCacheConfig;
pub use repository::{
    SemanticCache, SemanticCacheEntry, SemanticSearchParams, SemanticSearchResult,
};
