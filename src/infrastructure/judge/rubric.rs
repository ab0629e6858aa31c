//! LLM-backed rubric scorer for evaluation runs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::grounding::DEFAULT_JUDGE_TIMEOUT;
use crate::domain::evaluation::{AnswerScorer, RubricScores};
use crate::domain::llm::TextGenerator;
use crate::domain::verification::JudgeError;

/// Scores faithfulness and helpfulness (1-5) of an answer
#[derive(Debug)]
pub struct LlmAnswerScorer {
    generator: Arc<dyn TextGenerator>,
    documentation_name: String,
    timeout: Duration,
}

impl LlmAnswerScorer {
    pub fn new(generator: Arc<dyn TextGenerator>, documentation_name: impl Into<String>) -> Self {
        Self {
            generator,
            documentation_name: documentation_name.into(),
            timeout: DEFAULT_JUDGE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are an evaluator for a RAG system over {} docs.\n\
             You get a QUESTION, CONTEXT (retrieved docs) and an ANSWER.\n\
             You must judge:\n\
             - faithfulness: does the answer follow only from CONTEXT? (1-5)\n\
             - helpfulness: does the answer properly answer the QUESTION? (1-5)\n\
             Return STRICT JSON with keys: faithfulness, helpfulness, notes.\n\
             Example:\n\
             {{\n  \"faithfulness\": 4,\n  \"helpfulness\": 5,\n  \"notes\": \"short explanation\"\n}}\n\
             Do not add any other text.",
            self.documentation_name
        )
    }
}

fn user_message(question: &str, context: &str, answer: &str) -> String {
    format!(
        "QUESTION:\n{}\n\nCONTEXT:\n{}\n\nANSWER:\n{}\n\nNow respond ONLY with JSON.",
        question, context, answer
    )
}

/// The whole reply if it is a bare object, else the span from the first `{` to the last `}`
fn extract_json(text: &str) -> Option<&str> {
    let text = text.trim();
    if text.starts_with('{') && text.ends_with('}') {
        return Some(text);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[derive(Debug, Deserialize)]
struct RawScores {
    faithfulness: Option<f64>,
    helpfulness: Option<f64>,
    #[serde(default)]
    notes: String,
}

fn to_score(value: Option<f64>) -> Option<u8> {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(1.0, 5.0) as u8)
}

fn parse_scores(raw: &str) -> Result<RubricScores, JudgeError> {
    let json = extract_json(raw).ok_or_else(|| JudgeError::Parse {
        message: "no JSON object in judge reply".to_string(),
        raw: raw.to_string(),
    })?;

    let parsed: RawScores = serde_json::from_str(json).map_err(|e| JudgeError::Parse {
        message: e.to_string(),
        raw: raw.to_string(),
    })?;

    Ok(RubricScores::new(
        to_score(parsed.faithfulness),
        to_score(parsed.helpfulness),
        parsed.notes,
    ))
}

#[async_trait]
impl AnswerScorer for LlmAnswerScorer {
    async fn score(&self, question: &str, context: &str, answer: &str) -> Result<RubricScores, JudgeError> {
        let system = self.system_prompt();
        let user = user_message(question, context, answer);

        let raw = tokio::time::timeout(self.timeout, self.generator.generate(&system, &user))
            .await
            .map_err(|_| JudgeError::Timeout(self.timeout))?
            .map_err(|e| JudgeError::Invoke(e.to_string()))?;

        let scores = parse_scores(&raw);
        match &scores {
            Ok(s) => debug!(faithfulness = ?s.faithfulness, helpfulness = ?s.helpfulness, "Answer scored"),
            Err(e) => warn!("Rubric judge reply not usable: {}", e),
        }

        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockTextGenerator;
    use crate::domain::DomainError;

    fn scorer_replying(reply: &'static str) -> LlmAnswerScorer {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .returning(move |_, _| Ok(reply.to_string()));
        LlmAnswerScorer::new(Arc::new(generator), "QuantLib-Python")
    }

    #[test]
    fn test_extract_json() {
        assert_eq!(extract_json(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
        assert_eq!(
            extract_json("Sure! Here it is: {\"a\": {\"b\": 2}} hope it helps"),
            Some("{\"a\": {\"b\": 2}}")
        );
        assert_eq!(extract_json("no json"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn test_prompts() {
        let scorer = scorer_replying("{}");

        assert!(scorer.system_prompt().starts_with("You are an evaluator for a RAG system over QuantLib-Python docs."));
        assert!(scorer.system_prompt().contains("faithfulness, helpfulness, notes"));
        assert_eq!(
            user_message("Q", "C", "A"),
            "QUESTION:\nQ\n\nCONTEXT:\nC\n\nANSWER:\nA\n\nNow respond ONLY with JSON."
        );
    }

    #[tokio::test]
    async fn test_scores_wrapped_json() {
        let scorer = scorer_replying(
            "```json\n{\"faithfulness\": 4, \"helpfulness\": 5, \"notes\": \"copied from context\"}\n```",
        );

        let scores = scorer.score("q", "ctx", "answer").await.unwrap();

        assert_eq!(scores, RubricScores::new(Some(4), Some(5), "copied from context"));
    }

    #[tokio::test]
    async fn test_out_of_range_scores_are_clamped() {
        let scorer = scorer_replying(r#"{"faithfulness": 9, "helpfulness": 0.2, "notes": ""}"#);

        let scores = scorer.score("q", "ctx", "answer").await.unwrap();

        assert_eq!(scores.faithfulness, Some(5));
        assert_eq!(scores.helpfulness, Some(1));
    }

    #[tokio::test]
    async fn test_prose_reply_is_parse_error() {
        let scorer = scorer_replying("The answer looks fine to me.");

        let error = scorer.score("q", "ctx", "answer").await.unwrap_err();

        assert_eq!(error.classification(), "judge_parse_error");
        assert!(RubricScores::from_error(&error).notes.starts_with("judge_parse_error: "));
    }

    #[tokio::test]
    async fn test_invoke_error() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .returning(|_, _| Err(DomainError::provider("groq", "rate limited")));
        let scorer = LlmAnswerScorer::new(Arc::new(generator), "QuantLib-Python");

        let error = scorer.score("q", "ctx", "answer").await.unwrap_err();

        assert_eq!(error.classification(), "judge_invoke_error");
    }
}
