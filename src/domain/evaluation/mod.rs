//! Evaluation records, metrics and rubric scoring

mod metrics;
mod record;
mod scorer;
mod summary;

pub use metrics::{analyze_answer, hit_at_k, token_overlap_percent, AnswerAnalysis, ApiSymbolPattern};
pub use record::{EvaluationRecord, TestCase};
pub use scorer::{AnswerScorer, RubricScores, JUDGE_DISABLED, JUDGE_SKIPPED};
pub use summary::{summarize, BackendSummary};
