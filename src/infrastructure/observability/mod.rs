//! Observability infrastructure - Metrics

mod metrics;

pub use self::metrics::{
    init_metrics, record_exact_cache, record_generation_latency, record_judge,
    record_retrieval_empty, record_retrieval_latency, record_semantic_cache, CacheOutcome,
    PrometheusMetrics,
};
