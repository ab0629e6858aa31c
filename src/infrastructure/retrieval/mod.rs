//! Retriever implementations

mod qdrant;

pub use qdrant::{PayloadKeys, QdrantRetriever};
