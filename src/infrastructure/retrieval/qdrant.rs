//! Qdrant-backed retriever over a pre-built documentation index

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::RetrieverConfig;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::retrieval::{RetrievedPassage, Retriever};
use crate::domain::DomainError;
use crate::infrastructure::llm::HttpClientTrait;

/// Payload layout of indexed points
#[derive(Debug, Clone)]
pub struct PayloadKeys {
    /// Field holding passage text
    pub content: String,
    /// Dot path of the field holding the source identifier
    pub source: String,
}

impl Default for PayloadKeys {
    fn default() -> Self {
        Self {
            content: "page_content".to_string(),
            source: "metadata.source".to_string(),
        }
    }
}

/// Retriever that embeds the query and runs a vector search on a collection
#[derive(Debug)]
pub struct QdrantRetriever<C: HttpClientTrait> {
    client: C,
    embedder: Arc<dyn EmbeddingProvider>,
    url: String,
    collection: String,
    api_key: Option<String>,
    keys: PayloadKeys,
}

impl<C: HttpClientTrait> QdrantRetriever<C> {
    pub fn new(
        client: C,
        embedder: Arc<dyn EmbeddingProvider>,
        url: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            client,
            embedder,
            url: url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            api_key: None,
            keys: PayloadKeys::default(),
        }
    }

    pub fn from_config(
        client: C,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &RetrieverConfig,
        api_key: Option<String>,
    ) -> Self {
        let keys = PayloadKeys {
            content: config.content_key.clone(),
            source: config.source_key.clone(),
        };

        let mut retriever =
            Self::new(client, embedder, &config.url, &config.collection).with_payload_keys(keys);
        retriever.api_key = api_key;
        retriever
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_payload_keys(mut self, keys: PayloadKeys) -> Self {
        self.keys = keys;
        self
    }

    fn search_url(&self) -> String {
        format!("{}/collections/{}/points/search", self.url, self.collection)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];

        if let Some(ref key) = self.api_key {
            headers.push(("api-key", key.as_str()));
        }

        headers
    }

    fn to_passages(&self, json: serde_json::Value) -> Result<Vec<RetrievedPassage>, DomainError> {
        let response: SearchResponse = serde_json::from_value(json)
            .map_err(|e| DomainError::retrieval(format!("Malformed search response: {}", e)))?;

        let passages = response
            .result
            .into_iter()
            .enumerate()
            .map(|(rank, point)| {
                let payload = point.payload.unwrap_or(serde_json::Value::Null);
                let content = lookup_str(&payload, &self.keys.content).unwrap_or_default();
                let source = lookup_str(&payload, &self.keys.source).unwrap_or_default();
                RetrievedPassage::new(content, source, rank)
            })
            .collect();

        Ok(passages)
    }
}

#[async_trait]
impl<C: HttpClientTrait> Retriever for QdrantRetriever<C> {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>, DomainError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let vector = self
            .embedder
            .embed_text(query)
            .await
            .map_err(|e| DomainError::retrieval(format!("Query embedding failed: {}", e)))?;

        let body = serde_json::json!({
            "vector": vector,
            "limit": k,
            "with_payload": true,
        });

        let response = self
            .client
            .post_json(&self.search_url(), self.headers(), &body)
            .await
            .map_err(|e| DomainError::retrieval(format!("Vector search failed: {}", e)))?;

        let mut passages = self.to_passages(response)?;
        passages.truncate(k);

        debug!(
            collection = %self.collection,
            k = k,
            returned = passages.len(),
            "Vector search complete"
        );

        Ok(passages)
    }
}

/// Resolve a dot path such as `metadata.source` to a string
fn lookup_str(payload: &serde_json::Value, path: &str) -> Option<String> {
    let value = path
        .split('.')
        .try_fold(payload, |current, segment| current.get(segment))?;

    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    payload: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::infrastructure::llm::{HttpClient, MockHttpClient};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SEARCH_URL: &str = "http://localhost:6333/collections/quantlib_docs/points/search";

    fn search_result() -> serde_json::Value {
        serde_json::json!({
            "result": [
                {
                    "id": 1,
                    "score": 0.91,
                    "payload": {
                        "page_content": "curve = ql.FlatForward(today, 0.05, ql.Actual365Fixed())",
                        "metadata": { "source": "data/quantlib_md/termstructures.md" }
                    }
                },
                {
                    "id": 2,
                    "score": 0.72,
                    "payload": {
                        "page_content": "ql.Date(15, 6, 2020)",
                        "metadata": { "source": "data/quantlib_md/dates.md" }
                    }
                }
            ],
            "status": "ok"
        })
    }

    fn embedder() -> Arc<dyn EmbeddingProvider> {
        Arc::new(MockEmbeddingProvider::new(4))
    }

    #[tokio::test]
    async fn test_retrieve_maps_payload_and_rank() {
        let client = MockHttpClient::new().with_response(SEARCH_URL, search_result());
        let retriever = QdrantRetriever::new(client, embedder(), "http://localhost:6333/", "quantlib_docs");

        let passages = retriever.retrieve("flat yield curve", 5).await.unwrap();

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].rank, 0);
        assert_eq!(passages[0].source_basename(), "termstructures.md");
        assert!(passages[0].content.contains("FlatForward"));
        assert_eq!(passages[1].rank, 1);

        let requests = retriever.client.requests();
        assert_eq!(requests[0].2["limit"], 5);
        assert_eq!(requests[0].2["with_payload"], true);
        assert_eq!(requests[0].2["vector"].as_array().map(|v| v.len()), Some(4));
        assert!(requests[0].1.iter().all(|(k, _)| k != "api-key"));
    }

    #[tokio::test]
    async fn test_retrieve_truncates_to_k() {
        let client = MockHttpClient::new().with_response(SEARCH_URL, search_result());
        let retriever = QdrantRetriever::new(client, embedder(), "http://localhost:6333", "quantlib_docs");

        let passages = retriever.retrieve("q", 1).await.unwrap();

        assert_eq!(passages.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_k_skips_search() {
        let retriever =
            QdrantRetriever::new(MockHttpClient::new(), embedder(), "http://localhost:6333", "quantlib_docs");

        assert!(retriever.retrieve("q", 0).await.unwrap().is_empty());
        assert!(retriever.client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_is_retrieval_error() {
        let retriever = QdrantRetriever::new(
            MockHttpClient::new(),
            Arc::new(MockEmbeddingProvider::new(4).with_error("ollama down")),
            "http://localhost:6333",
            "quantlib_docs",
        );

        let result = retriever.retrieve("q", 3).await;

        assert!(matches!(result, Err(DomainError::Retrieval { .. })));
    }

    #[tokio::test]
    async fn test_custom_payload_keys() {
        let client = MockHttpClient::new().with_response(
            SEARCH_URL,
            serde_json::json!({"result": [{"payload": {"text": "body", "file": "basics.md"}}]}),
        );
        let retriever = QdrantRetriever::new(client, embedder(), "http://localhost:6333", "quantlib_docs")
            .with_payload_keys(PayloadKeys {
                content: "text".into(),
                source: "file".into(),
            });

        let passages = retriever.retrieve("q", 3).await.unwrap();

        assert_eq!(passages[0].content, "body");
        assert_eq!(passages[0].source_id, "basics.md");
    }

    #[tokio::test]
    async fn test_api_key_header_against_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections/quantlib_docs/points/search"))
            .and(header("api-key", "qdrant-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_result()))
            .expect(1)
            .mount(&server)
            .await;

        let retriever = QdrantRetriever::new(HttpClient::new(), embedder(), server.uri(), "quantlib_docs")
            .with_api_key("qdrant-secret");

        let passages = retriever.retrieve("flat yield curve", 2).await.unwrap();

        assert_eq!(passages.len(), 2);
    }

    #[test]
    fn test_lookup_str() {
        let payload = serde_json::json!({"metadata": {"source": "a.md", "page": 3}});

        assert_eq!(lookup_str(&payload, "metadata.source").as_deref(), Some("a.md"));
        assert_eq!(lookup_str(&payload, "metadata.page").as_deref(), Some("3"));
        assert_eq!(lookup_str(&payload, "metadata.missing"), None);
    }
}
