//! Rubric scoring capability used by the evaluator

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::verification::JudgeError;

/// Note recorded when no judge is configured
pub const JUDGE_DISABLED: &str = "judge_disabled";

/// Note recorded when judging was turned off for a run
pub const JUDGE_SKIPPED: &str = "judge_skipped";

/// Faithfulness/helpfulness scores (1-5) with the judge's notes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RubricScores {
    pub faithfulness: Option<u8>,
    pub helpfulness: Option<u8>,
    pub notes: String,
}

impl RubricScores {
    pub fn new(faithfulness: Option<u8>, helpfulness: Option<u8>, notes: impl Into<String>) -> Self {
        Self {
            faithfulness: faithfulness.map(|s| s.clamp(1, 5)),
            helpfulness: helpfulness.map(|s| s.clamp(1, 5)),
            notes: notes.into(),
        }
    }

    /// Null scores carrying only a note
    pub fn unscored(notes: impl Into<String>) -> Self {
        Self::new(None, None, notes)
    }

    /// Null scores whose note is the error's classification and message
    pub fn from_error(error: &JudgeError) -> Self {
        Self::unscored(error.to_string())
    }
}

/// Scores an answer against its question and context
#[async_trait]
pub trait AnswerScorer: Send + Sync + Debug {
    async fn score(&self, question: &str, context: &str, answer: &str) -> Result<RubricScores, JudgeError>;
}
