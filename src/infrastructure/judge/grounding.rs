//! LLM-backed grounding verifier

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::llm::TextGenerator;
use crate::domain::retrieval::RetrievedPassage;
use crate::domain::verification::{
    grounding_user_message, judge_context, parse_verdict, GroundingVerifier, JudgeError,
    VerdictParse, GROUNDING_SYSTEM_PROMPT,
};
use crate::infrastructure::observability::record_judge;

pub const DEFAULT_JUDGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Asks a secondary model whether an answer is supported by its contexts
#[derive(Debug)]
pub struct LlmGroundingVerifier {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl LlmGroundingVerifier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            timeout: DEFAULT_JUDGE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl GroundingVerifier for LlmGroundingVerifier {
    async fn judge(
        &self,
        question: &str,
        answer: &str,
        contexts: &[RetrievedPassage],
    ) -> Result<VerdictParse, JudgeError> {
        let context = judge_context(contexts);
        let user = grounding_user_message(question, &context, answer);

        debug!(judge = %self.generator.label(), contexts = contexts.len(), "Verifying answer");

        let raw = match tokio::time::timeout(
            self.timeout,
            self.generator.generate(GROUNDING_SYSTEM_PROMPT, &user),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                record_judge("judge_invoke_error");
                return Err(JudgeError::Invoke(e.to_string()));
            }
            Err(_) => {
                record_judge("judge_timeout");
                return Err(JudgeError::Timeout(self.timeout));
            }
        };

        let verdict = parse_verdict(&raw);
        record_judge(match &verdict {
            VerdictParse::Parsed(v) if v.is_grounded => "grounded",
            VerdictParse::Parsed(_) => "ungrounded",
            VerdictParse::ParseFailed(_) => "parse_error",
        });

        Ok(verdict)
    }
}
