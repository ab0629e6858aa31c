//! Docs RAG Engine
//!
//! Quote-only question answering over a documentation corpus:
//! - Vector retrieval from Qdrant with OpenAI-compatible embeddings
//! - Exact-match and semantic answer caching
//! - Optional LLM-as-judge grounding verification
//! - Offline evaluation (hit@k, hallucinated API detection, rubric scores)

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use domain::credentials::{CredentialProvider, CredentialType};
use domain::embedding::EmbeddingProvider;
use domain::evaluation::ApiSymbolPattern;
use domain::llm::TextGenerator;
use domain::semantic_cache::SemanticCache;
use domain::DomainError;
use infrastructure::{
    cache::AnswerCacheFactory,
    credentials::EnvCredentialProvider,
    embedding::EmbeddingProviderFactory,
    judge::{LlmAnswerScorer, LlmGroundingVerifier},
    llm::{HttpClient, LlmProviderFactory},
    retrieval::QdrantRetriever,
    semantic_cache::{InMemorySemanticCache, JsonlSemanticCache},
    services::{AnswerPipeline, Evaluator, GuardedPipeline, SemanticAnswerCache},
};
use tracing::info;

const RETRIEVER_TIMEOUT: Duration = Duration::from_secs(30);

/// Wired services for one configuration
#[derive(Debug)]
pub struct Application {
    pub config: AppConfig,
    pub pipeline: Arc<AnswerPipeline>,
    judge: Option<Arc<dyn TextGenerator>>,
    api_pattern: ApiSymbolPattern,
}

impl Application {
    pub fn judge_enabled(&self) -> bool {
        self.judge.is_some()
    }

    /// Answer pipeline with grounding verification; needs a configured judge
    pub fn guarded(&self) -> Result<GuardedPipeline, DomainError> {
        let judge = self.judge.clone().ok_or_else(|| {
            DomainError::configuration("Guarded answering requires judge.enabled = true")
        })?;

        let verifier = LlmGroundingVerifier::new(judge)
            .with_timeout(Duration::from_secs(self.config.judge.timeout_secs.max(1)));

        Ok(GuardedPipeline::new(self.pipeline.clone(), Arc::new(verifier)))
    }

    /// Evaluator labelled with the configured backend name
    pub fn evaluator(&self) -> Evaluator {
        let evaluator = Evaluator::new(
            self.pipeline.clone(),
            &self.config.evaluation.backend_label,
            self.api_pattern.clone(),
        );

        match self.judge {
            Some(ref judge) => {
                let scorer = LlmAnswerScorer::new(judge.clone(), &self.config.pipeline.documentation_name)
                    .with_timeout(Duration::from_secs(self.config.judge.timeout_secs.max(1)));
                evaluator.with_scorer(Arc::new(scorer))
            }
            None => evaluator,
        }
    }
}

/// Build the application from configuration, reading secrets from the environment
pub async fn build_application(config: &AppConfig) -> anyhow::Result<Application> {
    build_application_with_credentials(config, &EnvCredentialProvider::default()).await
}

pub async fn build_application_with_credentials(
    config: &AppConfig,
    credentials: &dyn CredentialProvider,
) -> anyhow::Result<Application> {
    let api_pattern = ApiSymbolPattern::new(&config.evaluation.api_namespace)?;

    let embedder = EmbeddingProviderFactory::from_config(&config.embedding, credentials).await?;
    info!(
        provider = embedder.provider_name(),
        model = %config.embedding.model,
        "Embedding provider configured"
    );

    let retriever_key = retriever_api_key(config, credentials).await?;
    let retriever = QdrantRetriever::from_config(
        HttpClient::with_timeout(RETRIEVER_TIMEOUT)?,
        embedder.clone(),
        &config.retriever,
        retriever_key,
    );
    info!(
        url = %config.retriever.url,
        collection = %config.retriever.collection,
        "Retriever configured"
    );

    let generator = LlmProviderFactory::generator_from_config(&config.generator, credentials).await?;
    let exact_cache = AnswerCacheFactory::create(&config.exact_cache);

    let mut pipeline = AnswerPipeline::new(
        Arc::new(retriever),
        Arc::new(generator),
        exact_cache,
        config.pipeline.clone(),
    );

    if config.semantic_cache.cache.enabled {
        let semantic = build_semantic_cache(config, embedder).await?;
        pipeline = pipeline.with_semantic_cache(Arc::new(semantic));
    }

    let judge: Option<Arc<dyn TextGenerator>> = if config.judge.enabled {
        let judge = LlmProviderFactory::generator_from_config(&config.judge.model, credentials).await?;
        Some(Arc::new(judge))
    } else {
        info!("Judge disabled");
        None
    };

    Ok(Application {
        config: config.clone(),
        pipeline: Arc::new(pipeline),
        judge,
        api_pattern,
    })
}

async fn build_semantic_cache(
    config: &AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
) -> Result<SemanticAnswerCache, DomainError> {
    let settings = &config.semantic_cache;
    let store: Arc<dyn SemanticCache> = match settings.path {
        Some(ref path) => Arc::new(JsonlSemanticCache::open(path, settings.cache.max_entries).await?),
        None => Arc::new(InMemorySemanticCache::with_max_entries(settings.cache.max_entries)),
    };

    info!(
        threshold = settings.cache.threshold(),
        persistent = settings.path.is_some(),
        "Semantic cache configured"
    );

    Ok(SemanticAnswerCache::with_config(store, embedder, settings.cache.clone()))
}

/// An explicit variable is required; otherwise the default Qdrant key is optional
async fn retriever_api_key(
    config: &AppConfig,
    credentials: &dyn CredentialProvider,
) -> Result<Option<String>, DomainError> {
    match config.retriever.api_key_env.as_deref().filter(|v| !v.trim().is_empty()) {
        Some(var) => {
            let credential = credentials
                .get_credential(&CredentialType::Custom(var.trim().to_string()))
                .await?;
            Ok(Some(credential.api_key().to_string()))
        }
        None => match credentials.get_credential(&CredentialType::Qdrant).await {
            Ok(credential) => Ok(Some(credential.api_key().to_string())),
            Err(DomainError::MissingCredential { .. }) | Err(DomainError::Configuration { .. }) => {
                Ok(None)
            }
            Err(e) => Err(e),
        },
    }
}
