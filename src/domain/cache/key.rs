//! Exact-match cache key

use std::fmt;

use crate::domain::answer::{normalize_question, AnswerMode};

/// Key of the exact-match answer cache
///
/// Rendered as `<mode>||k=<k>||<normalized question>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    normalized_question: String,
    k: usize,
    mode: AnswerMode,
}

impl CacheKey {
    pub fn new(question: &str, k: usize, mode: AnswerMode) -> Self {
        Self {
            normalized_question: normalize_question(question),
            k,
            mode,
        }
    }

    pub fn quote_only(question: &str, k: usize) -> Self {
        Self::new(question, k, AnswerMode::QuoteOnly)
    }

    pub fn normalized_question(&self) -> &str {
        &self.normalized_question
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn mode(&self) -> AnswerMode {
        self.mode
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}||k={}||{}", self.mode, self.k, self.normalized_question)
    }
}
