//! Chat model provider implementations

mod factory;
mod http_client;
mod openai;

pub use factory::{credential_type_for, resolve_credential, LlmProviderFactory};
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::{
    ollama_api_root, OpenAiProvider, DEFAULT_GEMINI_API_ROOT, DEFAULT_GROQ_API_ROOT,
    DEFAULT_OLLAMA_HOST, DEFAULT_OPENAI_API_ROOT,
};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
