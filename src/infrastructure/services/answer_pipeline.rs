//! Quote-only answer pipeline with exact and semantic caching
//!
//! Lookup order is exact cache, semantic cache, then retrieval plus
//! generation. Every freshly produced result, including the canned
//! "no context" answer, is written to both cache tiers.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::semantic_answer_cache::SemanticAnswerCache;
use crate::config::PipelineConfig;
use crate::domain::answer::{
    build_context, AnswerResult, QuoteOnlyPrompt, SourceRef, CONTEXT_SEPARATOR, FALLBACK_ANSWER,
};
use crate::domain::cache::{AnswerCache, AnswerCacheExt, CacheKey};
use crate::domain::evaluation::{analyze_answer, AnswerAnalysis, ApiSymbolPattern};
use crate::domain::llm::TextGenerator;
use crate::domain::retrieval::{RetrievedPassage, Retriever};
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_exact_cache, record_generation_latency, record_retrieval_empty,
    record_retrieval_latency, CacheOutcome,
};

#[derive(Debug)]
pub struct AnswerPipeline {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn TextGenerator>,
    exact_cache: Arc<dyn AnswerCache>,
    semantic_cache: Option<Arc<SemanticAnswerCache>>,
    prompt: QuoteOnlyPrompt,
    config: PipelineConfig,
}

impl AnswerPipeline {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn TextGenerator>,
        exact_cache: Arc<dyn AnswerCache>,
        config: PipelineConfig,
    ) -> Self {
        let mut prompt = QuoteOnlyPrompt::new(&config.documentation_name);
        if let Some(ref hint) = config.code_style_hint {
            prompt = prompt.with_code_style_hint(hint);
        }

        Self {
            retriever,
            generator,
            exact_cache,
            semantic_cache: None,
            prompt,
            config,
        }
    }

    pub fn with_semantic_cache(mut self, cache: Arc<SemanticAnswerCache>) -> Self {
        self.semantic_cache = Some(cache);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn default_k(&self) -> usize {
        self.config.default_k
    }

    pub fn generator_label(&self) -> String {
        self.generator.label()
    }

    /// Answer with the configured `k` and passage length
    pub async fn answer_with_defaults(&self, question: &str) -> Result<AnswerResult, DomainError> {
        self.answer(question, self.config.default_k, self.config.max_chars_per_passage)
            .await
    }

    pub async fn answer(
        &self,
        question: &str,
        k: usize,
        max_chars_per_passage: usize,
    ) -> Result<AnswerResult, DomainError> {
        self.answer_inner(question, k, max_chars_per_passage, None).await
    }

    /// Like [`answer`](Self::answer) but a cache miss uses `passages`
    /// instead of querying the retriever again
    pub async fn answer_with_passages(
        &self,
        question: &str,
        k: usize,
        max_chars_per_passage: usize,
        passages: Vec<RetrievedPassage>,
    ) -> Result<AnswerResult, DomainError> {
        self.answer_inner(question, k, max_chars_per_passage, Some(passages))
            .await
    }

    /// Top-`k` passages for a question, without generation or caching
    pub async fn inspect_retrieval(
        &self,
        question: &str,
        k: usize,
    ) -> Result<Vec<RetrievedPassage>, DomainError> {
        self.retrieve(question, k).await
    }

    /// Compare an answer with freshly retrieved, untruncated context
    pub async fn analyze_answer(
        &self,
        question: &str,
        answer: &str,
        k: usize,
        pattern: &ApiSymbolPattern,
    ) -> Result<AnswerAnalysis, DomainError> {
        let passages = self.retrieve(question, k).await?;
        let context = passages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        Ok(analyze_answer(answer, &context, pattern))
    }

    async fn answer_inner(
        &self,
        question: &str,
        k: usize,
        max_chars_per_passage: usize,
        prefetched: Option<Vec<RetrievedPassage>>,
    ) -> Result<AnswerResult, DomainError> {
        let key = CacheKey::quote_only(question, k);

        if let Some(cached) = self.lookup_exact(&key).await {
            return Ok(cached);
        }

        if let Some(cached) = self.lookup_semantic(question, k, &key).await {
            return Ok(cached);
        }

        let passages = match prefetched {
            Some(mut passages) => {
                passages.truncate(k);
                passages
            }
            None => self.retrieve(question, k).await?,
        };

        if passages.is_empty() {
            info!(key = %key, "No context retrieved, caching fallback answer");
            record_retrieval_empty();
            let result = AnswerResult::no_context(question);
            self.store(question, &key, &result).await;
            return Ok(result);
        }

        let context = build_context(&passages, max_chars_per_passage);
        let system = self.prompt.system_instruction();
        let user = self.prompt.user_message(question, &context);

        let started = Instant::now();
        let generated = self.generator.generate(&system, &user).await?;
        record_generation_latency(started.elapsed());

        let answer_text = if generated.trim().is_empty() {
            warn!(generator = %self.generator.label(), "Generator returned blank text, using fallback");
            FALLBACK_ANSWER.to_string()
        } else {
            generated
        };

        let sources = passages
            .iter()
            .map(|p| SourceRef::from_passage(p, self.config.preview_chars))
            .collect();

        let result = AnswerResult::new(question, answer_text, sources);

        info!(
            key = %key,
            passages = passages.len(),
            generation_ms = started.elapsed().as_millis() as u64,
            "Answer generated"
        );

        self.store(question, &key, &result).await;
        Ok(result)
    }

    async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<RetrievedPassage>, DomainError> {
        let started = Instant::now();
        let mut passages = self.retriever.retrieve(question, k).await?;
        record_retrieval_latency(started.elapsed());

        passages.truncate(k);
        debug!(k = k, retrieved = passages.len(), "Retrieval complete");
        Ok(passages)
    }

    async fn lookup_exact(&self, key: &CacheKey) -> Option<AnswerResult> {
        match self.exact_cache.get::<AnswerResult>(key).await {
            Ok(Some(hit)) => {
                debug!(key = %key, "Exact cache hit");
                record_exact_cache(CacheOutcome::Hit);
                Some(hit)
            }
            Ok(None) => {
                debug!(key = %key, "Exact cache miss");
                record_exact_cache(CacheOutcome::Miss);
                None
            }
            Err(e) => {
                warn!(key = %key, "Exact cache lookup failed: {}", e);
                record_exact_cache(CacheOutcome::Error);
                None
            }
        }
    }

    /// A semantic hit is returned verbatim, so one citing more than `k`
    /// sources is treated as a miss.
    async fn lookup_semantic(&self, question: &str, k: usize, key: &CacheKey) -> Option<AnswerResult> {
        let semantic = self.semantic_cache.as_ref()?;
        let hit = semantic.get(question).await?;

        if hit.sources.len() > k {
            debug!(key = %key, sources = hit.sources.len(), "Semantic hit cites more than k sources, ignoring");
            return None;
        }

        if let Err(e) = self.exact_cache.set(key, &hit).await {
            warn!(key = %key, "Failed to promote semantic hit: {}", e);
        }

        Some(hit)
    }

    async fn store(&self, question: &str, key: &CacheKey, result: &AnswerResult) {
        if let Err(e) = self.exact_cache.set(key, result).await {
            warn!(key = %key, "Failed to write exact cache: {}", e);
        }

        if let Some(ref semantic) = self.semantic_cache {
            if let Err(e) = semantic.set(question, result).await {
                warn!("Failed to write semantic cache: {}", e);
            }
        }
    }
}
