use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use super::{VerdictParse, VerificationResult, PARSE_FAILURE_REASON};
use crate::domain::retrieval::RetrievedPassage;

/// Recoverable judge failures with their report classifications
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JudgeError {
    #[error("judge_invoke_error: {0}")]
    Invoke(String),

    #[error("judge_timeout: no response within {0:?}")]
    Timeout(Duration),

    #[error("judge_parse_error: {message}")]
    Parse { message: String, raw: String },
}

impl JudgeError {
    pub fn classification(&self) -> &'static str {
        match self {
            Self::Invoke(_) => "judge_invoke_error",
            Self::Timeout(_) => "judge_timeout",
            Self::Parse { .. } => "judge_parse_error",
        }
    }
}

/// Grounding verification capability
#[async_trait]
pub trait GroundingVerifier: Send + Sync + Debug {
    /// Raw judge outcome; transport failures and timeouts are errors
    async fn judge(
        &self,
        question: &str,
        answer: &str,
        contexts: &[RetrievedPassage],
    ) -> Result<VerdictParse, JudgeError>;

    /// Verdict that never fails: any judge problem yields the conservative verdict
    async fn verify(
        &self,
        question: &str,
        answer: &str,
        contexts: &[RetrievedPassage],
    ) -> VerificationResult {
        match self.judge(question, answer, contexts).await {
            Ok(VerdictParse::Parsed(verdict)) => verdict,
            Ok(VerdictParse::ParseFailed(raw)) => {
                warn!(raw = %raw, "Judge returned an undecodable verdict");
                VerificationResult::conservative(PARSE_FAILURE_REASON)
            }
            Err(e) => {
                warn!(classification = e.classification(), "Judge invocation failed: {}", e);
                VerificationResult::conservative(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FixedJudge(Result<VerdictParse, JudgeError>);

    #[async_trait]
    impl GroundingVerifier for FixedJudge {
        async fn judge(
            &self,
            _question: &str,
            _answer: &str,
            _contexts: &[RetrievedPassage],
        ) -> Result<VerdictParse, JudgeError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_classifications() {
        assert_eq!(JudgeError::Invoke("x".into()).classification(), "judge_invoke_error");
        assert_eq!(JudgeError::Timeout(Duration::from_secs(1)).classification(), "judge_timeout");
        assert_eq!(
            JudgeError::Parse { message: "eof".into(), raw: String::new() }.classification(),
            "judge_parse_error"
        );
        assert_eq!(JudgeError::Invoke("boom".into()).to_string(), "judge_invoke_error: boom");
    }

    #[tokio::test]
    async fn test_verify_passes_parsed_verdict_through() {
        let verdict = VerificationResult::new(true, false, 4, "ok");
        let judge = FixedJudge(Ok(VerdictParse::Parsed(verdict.clone())));

        assert_eq!(judge.verify("q", "a", &[]).await, verdict);
    }

    #[tokio::test]
    async fn test_verify_never_fails() {
        let parse_failed = FixedJudge(Ok(VerdictParse::ParseFailed("nope".into())));
        let verdict = parse_failed.verify("q", "a", &[]).await;
        assert_eq!(verdict, VerificationResult::conservative(PARSE_FAILURE_REASON));

        let timed_out = FixedJudge(Err(JudgeError::Timeout(Duration::from_millis(10))));
        let verdict = timed_out.verify("q", "a", &[]).await;
        assert!(!verdict.is_grounded);
        assert!(verdict.out_of_scope);
        assert_eq!(verdict.faithfulness_score, 1);
        assert!(verdict.reason.starts_with("judge_timeout"));
    }
}
