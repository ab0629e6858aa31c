//! Infrastructure layer - External service implementations

pub mod cache;
pub mod credentials;
pub mod embedding;
pub mod evaluation;
pub mod judge;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod retrieval;
pub mod semantic_cache;
pub mod services;
