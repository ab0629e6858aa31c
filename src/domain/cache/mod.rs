//! Exact-match answer cache domain

mod key;
mod repository;

pub use key::CacheKey;
pub use repository::{AnswerCache, AnswerCacheExt};
