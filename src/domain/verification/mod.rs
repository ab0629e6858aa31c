//! Grounding verification (LLM-as-judge) domain

mod prompt;
mod verdict;
mod verifier;

pub use prompt::{grounding_user_message, judge_context, GROUNDING_SYSTEM_PROMPT, JUDGE_CONTEXT_SEPARATOR};
pub use verdict::{parse_verdict, strip_code_fences, VerdictParse, VerificationResult, PARSE_FAILURE_REASON};
pub use verifier::{GroundingVerifier, JudgeError};
