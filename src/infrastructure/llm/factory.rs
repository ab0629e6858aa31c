use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::http_client::HttpClient;
use super::openai::{ollama_api_root, OpenAiProvider, DEFAULT_GEMINI_API_ROOT, DEFAULT_OLLAMA_HOST};
use crate::config::{ModelConfig, ProviderKind};
use crate::domain::credentials::{Credential, CredentialProvider, CredentialType};
use crate::domain::llm::{ChatModelGenerator, LlmProvider};
use crate::domain::DomainError;

/// Credential a backend needs, if any
///
/// An explicit `api_key_env` always makes the credential required; the local
/// model server needs none by default.
pub fn credential_type_for(kind: ProviderKind, api_key_env: Option<&str>) -> Option<CredentialType> {
    if let Some(var) = api_key_env.filter(|v| !v.trim().is_empty()) {
        return Some(CredentialType::Custom(var.trim().to_string()));
    }

    match kind {
        ProviderKind::Ollama => None,
        ProviderKind::Groq => Some(CredentialType::Groq),
        ProviderKind::OpenAi => Some(CredentialType::OpenAi),
        ProviderKind::Gemini => Some(CredentialType::Gemini),
    }
}

/// Resolve a required credential up front so a missing one fails construction
pub async fn resolve_credential(
    credentials: &dyn CredentialProvider,
    kind: ProviderKind,
    api_key_env: Option<&str>,
) -> Result<Option<Credential>, DomainError> {
    match credential_type_for(kind, api_key_env) {
        Some(credential_type) => credentials.get_credential(&credential_type).await.map(Some),
        None => Ok(None),
    }
}

/// Factory for chat providers and generators
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create a chat provider for a backend
    pub fn create(
        kind: ProviderKind,
        base_url: Option<&str>,
        credential: Option<&Credential>,
        timeout: Duration,
    ) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let http_client = HttpClient::with_timeout(timeout)?;
        let api_key = credential.map(|c| c.api_key().to_string());

        let require_key = |kind: &str| {
            api_key
                .clone()
                .ok_or_else(|| DomainError::configuration(format!("{} backend requires an API key", kind)))
        };

        let provider = match kind {
            ProviderKind::Ollama => {
                let host = base_url.unwrap_or(DEFAULT_OLLAMA_HOST);
                OpenAiProvider::with_api_root(http_client, api_key.clone(), ollama_api_root(host))
                    .named("ollama")
            }
            ProviderKind::Groq => match base_url {
                Some(url) => OpenAiProvider::with_api_root(http_client, Some(require_key("groq")?), url)
                    .named("groq"),
                None => OpenAiProvider::groq(http_client, require_key("groq")?),
            },
            ProviderKind::OpenAi => match base_url {
                Some(url) => OpenAiProvider::with_api_root(http_client, Some(require_key("openai")?), url),
                None => OpenAiProvider::new(http_client, require_key("openai")?),
            },
            ProviderKind::Gemini => OpenAiProvider::with_api_root(
                http_client,
                Some(require_key("gemini")?),
                base_url.unwrap_or(DEFAULT_GEMINI_API_ROOT),
            )
            .named("gemini"),
        };

        Ok(Arc::new(provider))
    }

    /// Build a text generator from model configuration
    pub async fn generator_from_config(
        config: &ModelConfig,
        credentials: &dyn CredentialProvider,
    ) -> Result<ChatModelGenerator, DomainError> {
        let credential =
            resolve_credential(credentials, config.provider, config.api_key_env.as_deref()).await?;

        let provider = Self::create(
            config.provider,
            config.base_url.as_deref(),
            credential.as_ref(),
            Duration::from_secs(config.request_timeout_secs.max(1)),
        )?;

        info!(
            provider = provider.provider_name(),
            model = %config.model,
            "Chat model configured"
        );

        let mut generator =
            ChatModelGenerator::new(provider, &config.model).with_temperature(config.temperature);

        if let Some(max_tokens) = config.max_tokens {
            generator = generator.with_max_tokens(max_tokens);
        }

        Ok(generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credentials::mock::MockCredentialProvider;
    use crate::domain::llm::TextGenerator;

    #[test]
    fn test_credential_type_for() {
        assert_eq!(credential_type_for(ProviderKind::Ollama, None), None);
        assert_eq!(credential_type_for(ProviderKind::Groq, None), Some(CredentialType::Groq));
        assert_eq!(
            credential_type_for(ProviderKind::Ollama, Some("OLLAMA_TOKEN")),
            Some(CredentialType::Custom("OLLAMA_TOKEN".into()))
        );
        assert_eq!(credential_type_for(ProviderKind::OpenAi, Some(" ")), Some(CredentialType::OpenAi));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_construction() {
        let config = ModelConfig {
            provider: ProviderKind::Groq,
            model: "llama-3.1-8b-instant".into(),
            ..ModelConfig::default()
        };

        let result = LlmProviderFactory::generator_from_config(&config, &MockCredentialProvider::new()).await;

        assert!(matches!(result, Err(DomainError::MissingCredential { .. })));
    }

    #[tokio::test]
    async fn test_groq_generator_with_credential() {
        let config = ModelConfig {
            provider: ProviderKind::Groq,
            model: "llama-3.1-8b-instant".into(),
            ..ModelConfig::default()
        };
        let credentials = MockCredentialProvider::new()
            .with_credential(Credential::new(CredentialType::Groq, "gsk-test"));

        let generator = LlmProviderFactory::generator_from_config(&config, &credentials)
            .await
            .unwrap();

        assert_eq!(generator.label(), "groq/llama-3.1-8b-instant");
    }

    #[tokio::test]
    async fn test_ollama_needs_no_credential() {
        let generator =
            LlmProviderFactory::generator_from_config(&ModelConfig::default(), &MockCredentialProvider::new())
                .await
                .unwrap();

        assert_eq!(generator.label(), "ollama/mistral");
    }
}
