//! Pipeline metrics recorded through the `metrics` facade
//!
//! Without an installed recorder every call is a no-op, so library users and
//! tests pay nothing. The `eval` command installs a Prometheus recorder and
//! writes the rendered snapshot next to its report.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::domain::DomainError;

/// Handle used to render the Prometheus text exposition
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder
pub fn init_metrics() -> Result<PrometheusMetrics, DomainError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| DomainError::configuration(format!("Failed to install metrics recorder: {}", e)))?;

    gauge!("rag_engine_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
    tracing::info!("Prometheus metrics recorder installed");

    Ok(PrometheusMetrics {
        handle: Arc::new(handle),
    })
}

/// Outcome label of a cache lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
    Error,
}

impl CacheOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Error => "error",
        }
    }
}

pub fn record_exact_cache(outcome: CacheOutcome) {
    counter!("rag_exact_cache_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_semantic_cache(outcome: CacheOutcome) {
    counter!("rag_semantic_cache_total", "outcome" => outcome.as_str()).increment(1);
}

/// Judge outcomes: `grounded`, `ungrounded`, `parse_error`, `judge_timeout`, `judge_invoke_error`
pub fn record_judge(outcome: &'static str) {
    counter!("rag_judge_total", "outcome" => outcome).increment(1);
}

pub fn record_retrieval_empty() {
    counter!("rag_retrieval_empty_total").increment(1);
}

pub fn record_retrieval_latency(duration: Duration) {
    histogram!("rag_retrieval_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_generation_latency(duration: Duration) {
    histogram!("rag_generation_duration_seconds").record(duration.as_secs_f64());
}
