//! Retrieval capability consumed by the answer pipeline

mod passage;
mod retriever;

pub use passage::{basename, truncate_chars, RetrievedPassage};
pub use retriever::Retriever;

#[cfg(test)]
pub use retriever::MockRetriever;
