//! Answer pipeline followed by an advisory grounding check

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::answer_pipeline::AnswerPipeline;
use crate::domain::answer::{AnswerResult, SourceRef};
use crate::domain::retrieval::RetrievedPassage;
use crate::domain::verification::{GroundingVerifier, VerificationResult};
use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardedStage {
    Retrieve,
    Generate,
    Verify,
    Done,
}

/// Final state of a guarded run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardedAnswer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
    /// Passages shown to the judge
    pub contexts: Vec<RetrievedPassage>,
    pub verification: VerificationResult,
}

#[derive(Debug)]
pub struct GuardedPipeline {
    pipeline: Arc<AnswerPipeline>,
    verifier: Arc<dyn GroundingVerifier>,
    k_for_verification: Option<usize>,
}

impl GuardedPipeline {
    pub fn new(pipeline: Arc<AnswerPipeline>, verifier: Arc<dyn GroundingVerifier>) -> Self {
        Self {
            pipeline,
            verifier,
            k_for_verification: None,
        }
    }

    /// Number of passages retrieved for the judge; defaults to the pipeline's `k`
    pub fn with_verification_k(mut self, k: usize) -> Self {
        self.k_for_verification = Some(k);
        self
    }

    fn verification_k(&self) -> usize {
        self.k_for_verification.unwrap_or_else(|| self.pipeline.default_k())
    }

    /// Runs retrieve, generate and verify in order.
    ///
    /// Retrieval and generation errors abort the run. The verifier never
    /// fails: judge problems surface as a conservative verdict.
    pub async fn run(&self, question: &str) -> Result<GuardedAnswer, DomainError> {
        let mut stage = GuardedStage::Retrieve;
        let mut contexts: Vec<RetrievedPassage> = Vec::new();
        let mut result: Option<AnswerResult> = None;
        let mut verification: Option<VerificationResult> = None;

        while stage != GuardedStage::Done {
            debug!(stage = ?stage, "Guarded pipeline stage");
            stage = match stage {
                GuardedStage::Retrieve => {
                    contexts = self
                        .pipeline
                        .inspect_retrieval(question, self.verification_k())
                        .await?;
                    GuardedStage::Generate
                }
                GuardedStage::Generate => {
                    let config = self.pipeline.config();
                    let answer = if self.verification_k() >= config.default_k {
                        self.pipeline
                            .answer_with_passages(
                                question,
                                config.default_k,
                                config.max_chars_per_passage,
                                contexts.clone(),
                            )
                            .await?
                    } else {
                        self.pipeline.answer_with_defaults(question).await?
                    };
                    result = Some(answer);
                    GuardedStage::Verify
                }
                GuardedStage::Verify => {
                    let answer_text = result
                        .as_ref()
                        .map(|r| r.answer_text.as_str())
                        .unwrap_or_default();
                    verification = Some(self.verifier.verify(question, answer_text, &contexts).await);
                    GuardedStage::Done
                }
                GuardedStage::Done => GuardedStage::Done,
            };
        }

        let result = result
            .ok_or_else(|| DomainError::internal("Guarded pipeline finished without an answer"))?;
        let verification = verification
            .ok_or_else(|| DomainError::internal("Guarded pipeline finished without a verdict"))?;

        info!(
            grounded = verification.is_grounded,
            out_of_scope = verification.out_of_scope,
            faithfulness = verification.faithfulness_score,
            "Guarded answer verified"
        );

        Ok(GuardedAnswer {
            question: question.to_string(),
            answer: result.answer_text,
            sources: result.sources,
            contexts,
            verification,
        })
    }
}
