//! LLM-as-judge implementations

mod grounding;
mod rubric;

pub use grounding::{LlmGroundingVerifier, DEFAULT_JUDGE_TIMEOUT};
pub use rubric::LlmAnswerScorer;
