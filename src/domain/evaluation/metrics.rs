//! Retrieval and hallucination heuristics

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::domain::retrieval::basename;
use crate::domain::DomainError;

static WORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("static regex"));

/// 1 when the gold source's basename is among the retrieved basenames
pub fn hit_at_k<S: AsRef<str>>(gold_source: &str, retrieved_sources: &[S]) -> u8 {
    let gold = basename(gold_source.trim());

    let hit = retrieved_sources
        .iter()
        .any(|source| basename(source.as_ref()) == gold);

    u8::from(hit)
}

fn word_tokens(text: &str) -> BTreeSet<String> {
    WORD_TOKEN
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Percentage of distinct answer tokens also present in the context
///
/// Returns 0 when the answer has no tokens.
pub fn token_overlap_percent(answer: &str, context: &str) -> f64 {
    let answer_tokens = word_tokens(answer);

    if answer_tokens.is_empty() {
        return 0.0;
    }

    let context_tokens = word_tokens(context);
    let shared = answer_tokens.intersection(&context_tokens).count();

    shared as f64 / answer_tokens.len() as f64 * 100.0
}

/// Matcher for `namespace.identifier` API tokens
#[derive(Debug, Clone)]
pub struct ApiSymbolPattern {
    namespace: String,
    regex: Regex,
}

impl ApiSymbolPattern {
    pub fn new(namespace: &str) -> Result<Self, DomainError> {
        if namespace.trim().is_empty() {
            return Err(DomainError::configuration("API namespace must not be empty"));
        }

        let pattern = format!(r"\b{}\.\w+", regex::escape(namespace.trim()));
        let regex = Regex::new(&pattern).map_err(|e| {
            DomainError::configuration(format!("Invalid API namespace '{}': {}", namespace, e))
        })?;

        Ok(Self {
            namespace: namespace.trim().to_string(),
            regex,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn symbols(&self, text: &str) -> BTreeSet<String> {
        self.regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Comparison of an answer against the context it was generated from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerAnalysis {
    pub overlap_percent: f64,
    pub api_in_answer: BTreeSet<String>,
    pub api_in_context: BTreeSet<String>,
    /// Potential hallucinations
    pub api_only_in_answer: BTreeSet<String>,
    pub api_in_both: BTreeSet<String>,
}

impl AnswerAnalysis {
    pub fn has_suspect_api(&self) -> bool {
        !self.api_only_in_answer.is_empty()
    }
}

pub fn analyze_answer(answer: &str, context: &str, pattern: &ApiSymbolPattern) -> AnswerAnalysis {
    let api_in_answer = pattern.symbols(answer);
    let api_in_context = pattern.symbols(context);

    let api_only_in_answer = api_in_answer.difference(&api_in_context).cloned().collect();
    let api_in_both = api_in_answer.intersection(&api_in_context).cloned().collect();

    AnswerAnalysis {
        overlap_percent: token_overlap_percent(answer, context),
        api_in_answer,
        api_in_context,
        api_only_in_answer,
        api_in_both,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_at_k() {
        let retrieved = ["a.md", "b.md"];

        assert_eq!(hit_at_k("b.md", &retrieved), 1);
        assert_eq!(hit_at_k("c.md", &retrieved), 0);
    }

    #[test]
    fn test_hit_at_k_compares_basenames() {
        let retrieved = vec!["data/quantlib_md/dates.md".to_string()];

        assert_eq!(hit_at_k("dates.md", &retrieved), 1);
        assert_eq!(hit_at_k("/other/prefix/dates.md", &retrieved), 1);
        assert_eq!(hit_at_k("dates.md", &Vec::<String>::new()), 0);
    }

    #[test]
    fn test_overlap() {
        assert_eq!(token_overlap_percent("", "anything"), 0.0);
        assert_eq!(token_overlap_percent("?!", "anything"), 0.0);
        assert_eq!(token_overlap_percent("Flat Forward", "a flat forward curve"), 100.0);
        assert_eq!(token_overlap_percent("flat curve", "flat forward"), 50.0);
        // distinct tokens only
        assert_eq!(token_overlap_percent("flat flat flat curve", "flat"), 50.0);
    }

    #[test]
    fn test_api_hallucination_heuristic() {
        let pattern = ApiSymbolPattern::new("ns").unwrap();

        let analysis = analyze_answer("Use ns.Foo here", "The docs show ns.Bar", &pattern);

        assert_eq!(analysis.api_only_in_answer, BTreeSet::from(["ns.Foo".to_string()]));
        assert!(analysis.api_in_both.is_empty());
        assert_eq!(analysis.api_in_context, BTreeSet::from(["ns.Bar".to_string()]));
        assert!(analysis.has_suspect_api());
    }

    #[test]
    fn test_api_symbols_shared() {
        let pattern = ApiSymbolPattern::new("ql").unwrap();

        let analysis = analyze_answer(
            "curve = ql.FlatForward(today, 0.05, ql.Actual365Fixed())",
            "ql.FlatForward(today, 0.05, ql.Actual365Fixed()) builds a flat curve",
            &pattern,
        );

        assert!(analysis.api_only_in_answer.is_empty());
        assert_eq!(analysis.api_in_both.len(), 2);
    }

    #[test]
    fn test_namespace_requires_word_boundary_and_is_escaped() {
        let pattern = ApiSymbolPattern::new("ql").unwrap();
        assert!(pattern.symbols("sql.execute").is_empty());

        let dotted = ApiSymbolPattern::new("a.b").unwrap();
        assert_eq!(dotted.symbols("a.b.C axb.D"), BTreeSet::from(["a.b.C".to_string()]));

        assert!(ApiSymbolPattern::new(" ").is_err());
    }
}
