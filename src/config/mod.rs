//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, EmbeddingConfig, EvaluationConfig, ExactCacheBackend, ExactCacheConfig,
    JudgeConfig, LogFormat, LoggingConfig, ModelConfig, PipelineConfig, ProviderKind,
    RetrieverConfig, SemanticCacheSettings,
};
