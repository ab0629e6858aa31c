use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Labeled question of an evaluation set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub question: String,
    /// Document expected among the retrieved sources (basename is enough)
    pub gold_source: String,
}

impl TestCase {
    pub fn new(question: impl Into<String>, gold_source: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            gold_source: gold_source.into(),
        }
    }
}

/// One evaluated question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub backend: String,
    pub question: String,
    pub gold_source: String,
    pub hit_at_k: u8,
    pub faithfulness: Option<u8>,
    pub helpfulness: Option<u8>,
    pub judge_notes: String,
    pub latency_retrieval_ms: f64,
    pub latency_llm_ms: f64,
    pub overlap_percent: f64,
    pub api_only_in_answer: BTreeSet<String>,
    pub answer: String,
    pub retrieved_sources: Vec<String>,
}

impl EvaluationRecord {
    pub fn has_suspect_api(&self) -> bool {
        !self.api_only_in_answer.is_empty()
    }

    pub fn is_judged(&self) -> bool {
        self.faithfulness.is_some() || self.helpfulness.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_case_deserialize() {
        let cases: Vec<TestCase> = serde_json::from_str(
            r#"[{"question": "How do I build a Date?", "gold_source": "dates.md"}]"#,
        )
        .unwrap();

        assert_eq!(cases, vec![TestCase::new("How do I build a Date?", "dates.md")]);
    }
}
