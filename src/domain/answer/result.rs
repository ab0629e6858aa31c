use serde::{Deserialize, Serialize};

use crate::domain::retrieval::{truncate_chars, RetrievedPassage};

/// Answer returned when retrieval finds nothing
pub const NO_CONTEXT_ANSWER: &str = "I couldn't find any relevant context in the documentation.";

/// Phrase the generator must use when the context has no working example
pub const FALLBACK_ANSWER: &str = "I don't know based on the provided documentation.";

/// Source attribution shown next to an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(rename = "source")]
    pub source_id: String,
    pub preview: String,
}

impl SourceRef {
    pub fn from_passage(passage: &RetrievedPassage, preview_chars: usize) -> Self {
        Self {
            source_id: passage.source_basename().to_string(),
            preview: truncate_chars(&passage.content, preview_chars).to_string(),
        }
    }
}

/// Unit stored in both answer caches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    #[serde(rename = "question_en")]
    pub question: String,
    #[serde(rename = "answer_en")]
    pub answer_text: String,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

impl AnswerResult {
    pub fn new(question: impl Into<String>, answer_text: impl Into<String>, sources: Vec<SourceRef>) -> Self {
        Self {
            question: question.into(),
            answer_text: answer_text.into(),
            sources,
        }
    }

    /// Canned result for a question with no retrieved context
    pub fn no_context(question: impl Into<String>) -> Self {
        Self::new(question, NO_CONTEXT_ANSWER, Vec::new())
    }

    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_names() {
        let result = AnswerResult::new(
            "How do I build a Date?",
            "ql.Date(15, 6, 2020)",
            vec![SourceRef {
                source_id: "dates.md".into(),
                preview: "Dates".into(),
            }],
        );

        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["question_en"], "How do I build a Date?");
        assert_eq!(json["answer_en"], "ql.Date(15, 6, 2020)");
        assert_eq!(json["sources"][0]["source"], "dates.md");
        assert_eq!(json["sources"][0]["preview"], "Dates");
    }

    #[test]
    fn test_no_context_result() {
        let result = AnswerResult::no_context("What is the moon made of?");

        assert_eq!(result.answer_text, NO_CONTEXT_ANSWER);
        assert!(!result.has_sources());
    }

    #[test]
    fn test_source_ref_uses_basename_and_char_preview() {
        let passage = RetrievedPassage::new("ééééé", "docs/md/dates.md", 0);
        let source = SourceRef::from_passage(&passage, 3);

        assert_eq!(source.source_id, "dates.md");
        assert_eq!(source.preview, "ééé");
    }
}
