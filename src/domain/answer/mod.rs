//! Answer model, question normalization and the quote-only prompt

mod normalize;
mod prompt;
mod result;

pub use normalize::normalize_question;
pub use prompt::{build_context, AnswerMode, QuoteOnlyPrompt, CONTEXT_SEPARATOR};
pub use result::{AnswerResult, SourceRef, FALLBACK_ANSWER, NO_CONTEXT_ANSWER};
