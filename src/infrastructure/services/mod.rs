//! Infrastructure services

mod answer_pipeline;
mod evaluator;
mod guarded_pipeline;
mod semantic_answer_cache;

pub use answer_pipeline::AnswerPipeline;
pub use evaluator::{Evaluator, JUDGE_PASSAGE_CHARS};
pub use guarded_pipeline::{GuardedAnswer, GuardedPipeline};
pub use semantic_answer_cache::SemanticAnswerCache;
