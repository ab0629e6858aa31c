use crate::domain::retrieval::RetrievedPassage;

/// Separator between passages shown to the judge
pub const JUDGE_CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

pub const GROUNDING_SYSTEM_PROMPT: &str = "You are a strict judge for a documentation-based QA assistant.
You receive: question, context, answer.
Return ONLY JSON with:
- is_grounded: true/false
- out_of_scope: true/false
- faithfulness_score: integer 1-5
- reason: short explanation in English.";

/// Join full passage contents for the judge
pub fn judge_context(contexts: &[RetrievedPassage]) -> String {
    contexts
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join(JUDGE_CONTEXT_SEPARATOR)
}

pub fn grounding_user_message(question: &str, context: &str, answer: &str) -> String {
    format!(
        "Question:\n{}\n\nContext:\n{}\n\nAnswer:\n{}",
        question, context, answer
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_judge_context_joins_full_content() {
        let contexts = vec![
            RetrievedPassage::new("first", "a.md", 0),
            RetrievedPassage::new("second", "b.md", 1),
        ];

        assert_eq!(judge_context(&contexts), "first\n\n---\n\nsecond");
    }

    #[test]
    fn test_user_message_layout() {
        let message = grounding_user_message("Q", "C", "A");
        assert_eq!(message, "Question:\nQ\n\nContext:\nC\n\nAnswer:\nA");
    }
}
