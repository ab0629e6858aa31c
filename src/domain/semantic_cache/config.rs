//! Semantic cache configuration

use serde::{Deserialize, Serialize};

/// Configuration for approximate (embedding-based) answer caching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// Whether semantic caching is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Minimum cosine similarity for a hit (0.0 to 1.0, inclusive)
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Optional capacity; oldest entries are dropped beyond it
    #[serde(default)]
    pub max_entries: Option<usize>,
}

fn default_enabled() -> bool {
    true
}

fn default_similarity_threshold() -> f32 {
    0.75
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            similarity_threshold: default_similarity_threshold(),
            max_entries: None,
        }
    }
}

impl SemanticCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the similarity threshold, clamped into [0, 1]
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Threshold as used for lookups, clamped into [0, 1]
    pub fn threshold(&self) -> f32 {
        self.similarity_threshold.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SemanticCacheConfig::default();

        assert!(config.enabled);
        assert!((config.similarity_threshold - 0.75).abs() < f32::EPSILON);
        assert_eq!(config.max_entries, None);
    }

    #[test]
    fn test_threshold_is_clamped() {
        assert_eq!(SemanticCacheConfig::new().with_similarity_threshold(1.5).threshold(), 1.0);
        assert_eq!(SemanticCacheConfig::new().with_similarity_threshold(-0.2).threshold(), 0.0);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SemanticCacheConfig =
            serde_json::from_str(r#"{"similarity_threshold": 0.9}"#).unwrap();

        assert!(config.enabled);
        assert!((config.threshold() - 0.9).abs() < f32::EPSILON);
    }
}
