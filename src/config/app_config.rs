use serde::{Deserialize, Serialize};

use crate::domain::semantic_cache::SemanticCacheConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub pipeline: PipelineConfig,
    pub exact_cache: ExactCacheConfig,
    pub semantic_cache: SemanticCacheSettings,
    pub generator: ModelConfig,
    pub judge: JudgeConfig,
    pub embedding: EmbeddingConfig,
    pub retriever: RetrieverConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Answer pipeline defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub default_k: usize,
    pub max_chars_per_passage: usize,
    pub preview_chars: usize,
    /// Name used in the quote-only instruction, e.g. "QuantLib-Python"
    pub documentation_name: String,
    /// Optional convention line for code examples
    pub code_style_hint: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_k: 5,
            max_chars_per_passage: 800,
            preview_chars: 300,
            documentation_name: "QuantLib-Python".to_string(),
            code_style_hint: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExactCacheBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExactCacheConfig {
    pub backend: ExactCacheBackend,
    pub path: String,
    /// Capacity of the in-memory backend
    pub max_capacity: u64,
    /// How long a writer waits for the cache file lock
    pub lock_timeout_ms: u64,
}

impl Default for ExactCacheConfig {
    fn default() -> Self {
        Self {
            backend: ExactCacheBackend::default(),
            path: "data/answer_cache.json".to_string(),
            max_capacity: 10_000,
            lock_timeout_ms: 10_000,
        }
    }
}

/// Semantic cache behaviour plus where its entries live
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SemanticCacheSettings {
    #[serde(flatten)]
    pub cache: SemanticCacheConfig,
    /// JSON-lines store; in-memory only when unset
    pub path: Option<String>,
}

impl Default for SemanticCacheSettings {
    fn default() -> Self {
        Self {
            cache: SemanticCacheConfig::default(),
            path: Some("data/semantic_cache.jsonl".to_string()),
        }
    }
}

/// Model backends reachable through the OpenAI-compatible protocol
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Ollama,
    Groq,
    OpenAi,
    Gemini,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub model: String,
    /// API root (with version segment) or Ollama host
    pub base_url: Option<String>,
    /// Overrides the provider's default credential variable
    pub api_key_env: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub request_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            model: "mistral".to_string(),
            base_url: None,
            api_key_env: None,
            temperature: 0.0,
            max_tokens: None,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
    #[serde(flatten)]
    pub model: ModelConfig,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 60,
            model: ModelConfig {
                provider: ProviderKind::Groq,
                model: "llama-3.3-70b-versatile".to_string(),
                ..ModelConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            model: "nomic-embed-text".to_string(),
            base_url: None,
            api_key_env: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    pub url: String,
    pub collection: String,
    /// Required when set; a local Qdrant needs no key
    pub api_key_env: Option<String>,
    /// Payload field holding passage text
    pub content_key: String,
    /// Dot path of the payload field holding the source identifier
    pub source_key: String,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            collection: "quantlib_docs".to_string(),
            api_key_env: None,
            content_key: "page_content".to_string(),
            source_key: "metadata.source".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub backend_label: String,
    /// Namespace of API symbols checked by the hallucination heuristic
    pub api_namespace: String,
    pub output_dir: String,
    pub concurrency: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            backend_label: "local".to_string(),
            api_namespace: "ql".to_string(),
            output_dir: "data/eval".to_string(),
            concurrency: 1,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
