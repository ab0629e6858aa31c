//! Embedding request types

use serde::{Deserialize, Serialize};

/// Request to generate embeddings for one or more texts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

impl EmbeddingRequest {
    /// Create a request for a single text
    pub fn single(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: vec![text.into()],
        }
    }

    /// Create a request for multiple texts
    pub fn batch(model: impl Into<String>, texts: Vec<String>) -> Self {
        Self {
            model: model.into(),
            input: texts,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn inputs(&self) -> &[String] {
        &self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_request_single() {
        let request = EmbeddingRequest::single("nomic-embed-text", "flat forward");

        assert_eq!(request.model(), "nomic-embed-text");
        assert_eq!(request.inputs(), &["flat forward".to_string()]);
    }

    #[test]
    fn test_embedding_request_batch() {
        let request = EmbeddingRequest::batch("nomic-embed-text", vec!["a".into(), "b".into()]);

        assert_eq!(request.inputs().len(), 2);
    }
}
