use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::OpenAiEmbeddingProvider;
use crate::config::{EmbeddingConfig, ProviderKind};
use crate::domain::credentials::CredentialProvider;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;
use crate::infrastructure::llm::{
    resolve_credential, HttpClient, DEFAULT_GEMINI_API_ROOT, DEFAULT_GROQ_API_ROOT,
    DEFAULT_OLLAMA_HOST, DEFAULT_OPENAI_API_ROOT,
};

const EMBEDDING_TIMEOUT: Duration = Duration::from_secs(60);

/// Factory for embedding providers
#[derive(Debug)]
pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    pub async fn from_config(
        config: &EmbeddingConfig,
        credentials: &dyn CredentialProvider,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        let credential =
            resolve_credential(credentials, config.provider, config.api_key_env.as_deref()).await?;
        let api_key = credential.map(|c| c.api_key().to_string());
        let client = HttpClient::with_timeout(EMBEDDING_TIMEOUT)?;
        let base_url = config.base_url.as_deref();

        let provider = match config.provider {
            ProviderKind::Ollama => {
                let host = base_url.unwrap_or(DEFAULT_OLLAMA_HOST);
                OpenAiEmbeddingProvider::ollama(client, host, &config.model)
            }
            ProviderKind::OpenAi => OpenAiEmbeddingProvider::with_api_root(
                client,
                api_key,
                base_url.unwrap_or(DEFAULT_OPENAI_API_ROOT),
                &config.model,
            ),
            ProviderKind::Gemini => OpenAiEmbeddingProvider::with_api_root(
                client,
                api_key,
                base_url.unwrap_or(DEFAULT_GEMINI_API_ROOT),
                &config.model,
            )
            .named("gemini"),
            ProviderKind::Groq => OpenAiEmbeddingProvider::with_api_root(
                client,
                api_key,
                base_url.unwrap_or(DEFAULT_GROQ_API_ROOT),
                &config.model,
            )
            .named("groq"),
        };

        info!(
            provider = provider.provider_name(),
            model = %config.model,
            "Embedding model configured"
        );

        Ok(Arc::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credentials::mock::MockCredentialProvider;

    #[tokio::test]
    async fn test_default_is_local_ollama() {
        let provider =
            EmbeddingProviderFactory::from_config(&EmbeddingConfig::default(), &MockCredentialProvider::new())
                .await
                .unwrap();

        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.default_model(), "nomic-embed-text");
    }

    #[tokio::test]
    async fn test_hosted_embedding_requires_credential() {
        let config = EmbeddingConfig {
            provider: ProviderKind::OpenAi,
            model: "text-embedding-3-small".into(),
            ..EmbeddingConfig::default()
        };

        let result = EmbeddingProviderFactory::from_config(&config, &MockCredentialProvider::new()).await;

        assert!(matches!(result, Err(DomainError::MissingCredential { .. })));
    }
}
