use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use crate::domain::llm::{
    FinishReason, LlmProvider, LlmRequest, LlmResponse, LlmResponseFormat, Message, MessageRole,
    Usage,
};
use crate::domain::DomainError;

pub const DEFAULT_OPENAI_API_ROOT: &str = "https://api.openai.com/v1";
pub const DEFAULT_GROQ_API_ROOT: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GEMINI_API_ROOT: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// API root of an Ollama host (`<host>/v1`)
pub fn ollama_api_root(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.ends_with("/v1") {
        host.to_string()
    } else {
        format!("{}/v1", host)
    }
}

/// Chat provider speaking the OpenAI `chat/completions` protocol
///
/// Serves OpenAI itself, Groq, Gemini's compatibility layer and a local
/// Ollama server. `api_root` includes the version segment.
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    name: &'static str,
    auth_header: Option<String>,
    api_root: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_api_root(client, Some(api_key.into()), DEFAULT_OPENAI_API_ROOT)
    }

    /// Hosted Groq endpoint
    pub fn groq(client: C, api_key: impl Into<String>) -> Self {
        Self::with_api_root(client, Some(api_key.into()), DEFAULT_GROQ_API_ROOT).named("groq")
    }

    /// Local Ollama server; no credential is sent
    pub fn ollama(client: C, host: &str) -> Self {
        Self::with_api_root(client, None, ollama_api_root(host)).named("ollama")
    }

    pub fn with_api_root(client: C, api_key: Option<String>, api_root: impl Into<String>) -> Self {
        let auth_header = api_key.map(|key| format!("Bearer {}", key));
        let api_root = api_root.into().trim_end_matches('/').to_string();

        Self {
            client,
            name: "openai",
            auth_header,
            api_root,
        }
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_root)
    }

    fn build_request(&self, model: &str, request: &LlmRequest) -> serde_json::Value {
        let messages: Vec<OpenAiMessage> = request
            .messages
            .iter()
            .map(OpenAiMessage::from_domain)
            .collect();

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if let Some(LlmResponseFormat::JsonObject) = request.response_format {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];

        if let Some(ref auth) = self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }

        headers
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(self.name, format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider(self.name, "No choices in response"))?;

        let message = Message::assistant(choice.message.content.unwrap_or_default());

        let mut llm_response = LlmResponse::new(response.id, response.model, message);

        if let Some(reason) = choice.finish_reason {
            llm_response = llm_response.with_finish_reason(parse_finish_reason(&reason));
        }

        if let Some(usage) = response.usage {
            llm_response =
                llm_response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiProvider<C> {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(model, &request);
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

impl OpenAiMessage {
    fn from_domain(message: &Message) -> Self {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        Self {
            role,
            content: message.content_text().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "model": "llama-3.1-8b-instant",
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 8, "total_tokens": 18 }
        })
    }

    #[tokio::test]
    async fn test_groq_chat() {
        let url = "https://api.groq.com/openai/v1/chat/completions";
        let client = MockHttpClient::new().with_response(url, completion("ql.Date(15, 6, 2020)"));
        let provider = OpenAiProvider::groq(client, "gsk-test");

        let request = LlmRequest::builder().system("s").user("How do I build a Date?").build();
        let response = provider.chat("llama-3.1-8b-instant", request).await.unwrap();

        assert_eq!(response.content(), "ql.Date(15, 6, 2020)");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().total_tokens, 18);
        assert_eq!(provider.provider_name(), "groq");
    }

    #[tokio::test]
    async fn test_request_body_and_headers() {
        let url = "https://api.groq.com/openai/v1/chat/completions";
        let client = MockHttpClient::new().with_response(url, completion("{}"));
        let provider = OpenAiProvider::groq(client, "gsk-test");

        let request = LlmRequest::builder()
            .system("judge")
            .user("verdict?")
            .temperature(0.0)
            .response_format(LlmResponseFormat::JsonObject)
            .build();
        provider.chat("llama-3.3-70b-versatile", request).await.unwrap();

        let requests = provider.client.requests();
        let (_, headers, body) = &requests[0];
        assert!(headers.contains(&("Authorization".to_string(), "Bearer gsk-test".to_string())));
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "verdict?");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["temperature"], 0.0);
    }

    #[tokio::test]
    async fn test_ollama_sends_no_authorization() {
        let url = "http://localhost:11434/v1/chat/completions";
        let client = MockHttpClient::new().with_response(url, completion("answer"));
        let provider = OpenAiProvider::ollama(client, "http://localhost:11434/");

        let request = LlmRequest::builder().user("Hi").build();
        provider.chat("mistral", request).await.unwrap();

        let requests = provider.client.requests();
        assert!(requests[0].1.iter().all(|(k, _)| k != "Authorization"));
        assert_eq!(provider.provider_name(), "ollama");
    }

    #[test]
    fn test_ollama_api_root() {
        assert_eq!(ollama_api_root("http://localhost:11434"), "http://localhost:11434/v1");
        assert_eq!(ollama_api_root("http://gpu:11434/v1/"), "http://gpu:11434/v1");
    }

    #[tokio::test]
    async fn test_error_handling() {
        let client = MockHttpClient::new()
            .with_error("https://api.openai.com/v1/chat/completions", "API key invalid");
        let provider = OpenAiProvider::new(client, "invalid-key");

        let result = provider.chat("gpt-4o-mini", LlmRequest::builder().user("Hi").build()).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_choices_is_error() {
        let url = "https://api.openai.com/v1/chat/completions";
        let client = MockHttpClient::new()
            .with_response(url, serde_json::json!({"id": "x", "model": "m", "choices": []}));
        let provider = OpenAiProvider::new(client, "k");

        let result = provider.chat("m", LlmRequest::builder().user("Hi").build()).await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }
}
