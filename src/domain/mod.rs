//! Domain layer: types, capability traits and pure algorithms

pub mod answer;
pub mod cache;
pub mod credentials;
pub mod embedding;
pub mod error;
pub mod evaluation;
pub mod llm;
pub mod retrieval;
pub mod semantic_cache;
pub mod verification;

pub use error::DomainError;
