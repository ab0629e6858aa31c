//! OpenAI-compatible embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::embedding::{Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;
use crate::infrastructure::llm::{ollama_api_root, HttpClientTrait, DEFAULT_OPENAI_API_ROOT};

/// Embedding provider speaking the OpenAI `embeddings` protocol
///
/// Ollama exposes the same endpoint under `<host>/v1`, so the local
/// `nomic-embed-text` model and hosted OpenAI models share this adapter.
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    name: &'static str,
    auth_header: Option<String>,
    api_root: String,
    model: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_api_root(client, Some(api_key.into()), DEFAULT_OPENAI_API_ROOT, model)
    }

    /// Local Ollama server; no credential is sent
    pub fn ollama(client: C, host: &str, model: impl Into<String>) -> Self {
        Self::with_api_root(client, None, ollama_api_root(host), model).named("ollama")
    }

    pub fn with_api_root(
        client: C,
        api_key: Option<String>,
        api_root: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            name: "openai",
            auth_header: api_key.map(|key| format!("Bearer {}", key)),
            api_root: api_root.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.api_root)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];

        if let Some(ref auth) = self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }

        headers
    }

    fn build_request(&self, request: &EmbeddingRequest) -> serde_json::Value {
        let input = match request.inputs() {
            [single] => serde_json::json!(single),
            many => serde_json::json!(many),
        };

        serde_json::json!({
            "model": request.model(),
            "input": input,
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<EmbeddingResponse, DomainError> {
        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(self.name, format!("Failed to parse embedding response: {}", e))
        })?;

        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        let embeddings: Vec<Embedding> = data
            .into_iter()
            .map(|d| Embedding::new(d.index, d.embedding))
            .collect();

        let model = response.model.unwrap_or_else(|| self.model.clone());

        Ok(EmbeddingResponse::new(model, embeddings))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let url = self.embeddings_url();
        let body = self.build_request(&request);

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}

// OpenAI API types for embeddings

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    model: Option<String>,
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}
