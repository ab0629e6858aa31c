//! Quote-only instruction envelope and context assembly

use std::fmt;

use super::FALLBACK_ANSWER;
use crate::domain::retrieval::{truncate_chars, RetrievedPassage};

/// Separator placed between passages in the context block
pub const CONTEXT_SEPARATOR: &str = "\n\n--- DOC SPLIT ---\n\n";

/// Generation contract, part of the exact-cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnswerMode {
    #[default]
    QuoteOnly,
}

impl AnswerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuoteOnly => "quote_only",
        }
    }
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concatenate passages, each cut to `max_chars_per_passage` characters
pub fn build_context(passages: &[RetrievedPassage], max_chars_per_passage: usize) -> String {
    passages
        .iter()
        .map(|p| truncate_chars(&p.content, max_chars_per_passage))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Fixed system/user messages for quote-only generation
#[derive(Debug, Clone)]
pub struct QuoteOnlyPrompt {
    documentation_name: String,
    code_style_hint: Option<String>,
}

impl QuoteOnlyPrompt {
    pub fn new(documentation_name: impl Into<String>) -> Self {
        Self {
            documentation_name: documentation_name.into(),
            code_style_hint: None,
        }
    }

    /// Extra line describing import/style conventions for code examples
    pub fn with_code_style_hint(mut self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        if !hint.trim().is_empty() {
            self.code_style_hint = Some(hint);
        }
        self
    }

    pub fn system_instruction(&self) -> String {
        let mut lines = vec![
            format!("You are assisting with the {} documentation.", self.documentation_name),
            "You MUST use ONLY classes, methods and functions that appear in the provided context."
                .to_string(),
        ];

        if let Some(ref hint) = self.code_style_hint {
            lines.push(hint.clone());
        }

        lines.push(
            "Do NOT invent new method or class names, and do not state facts that are not in the context."
                .to_string(),
        );
        lines.push("If the context does not clearly show a working example, reply:".to_string());
        lines.push(format!("'{}'", FALLBACK_ANSWER));
        lines.push("When you show code, it must only use APIs visible in the context.".to_string());

        lines.join("\n")
    }

    pub fn user_message(&self, question: &str, context: &str) -> String {
        format!(
            "Question:\n{}\n\nContext (multiple document chunks):\n{}\n\n\
             Answer the question ONLY by copying relevant parts from the context above. \
             Do not add any new text or code that is not already there.",
            question, context
        )
    }
}

impl Default for QuoteOnlyPrompt {
    fn default() -> Self {
        Self::new("project")
    }
}
