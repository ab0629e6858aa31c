//! Single-method text generation capability
//!
//! Pipelines and judges depend on [`TextGenerator`] only; backends are
//! plugged in through [`ChatModelGenerator`] or any other adapter.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::{LlmProvider, LlmRequest, LlmResponseFormat};
use crate::domain::DomainError;

/// Produces free text from a system instruction and a user message
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    async fn generate(&self, system: &str, user: &str) -> Result<String, DomainError>;

    /// Human-readable backend/model label used in logs and reports
    fn label(&self) -> String;
}

/// Adapter binding a chat provider to a model and sampling settings
#[derive(Debug, Clone)]
pub struct ChatModelGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    response_format: Option<LlmResponseFormat>,
}

impl ChatModelGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            response_format: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask the backend for a JSON object response
    pub fn json_mode(mut self) -> Self {
        self.response_format = Some(LlmResponseFormat::JsonObject);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for ChatModelGenerator {
    async fn generate(&self, system: &str, user: &str) -> Result<String, DomainError> {
        let mut builder = LlmRequest::builder()
            .system(system)
            .user(user)
            .temperature(self.temperature);

        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        if let Some(format) = self.response_format {
            builder = builder.response_format(format);
        }

        let response = self.provider.chat(&self.model, builder.build()).await?;

        Ok(response.content().trim().to_string())
    }

    fn label(&self) -> String {
        format!("{}/{}", self.provider.provider_name(), self.model)
    }
}
