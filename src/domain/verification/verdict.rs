//! Grounding verdict and its tolerant decoding

use serde::{Deserialize, Serialize};

/// Reason attached to the conservative verdict when decoding fails
pub const PARSE_FAILURE_REASON: &str = "parse failure";

/// Judge's classification of an answer against its context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_grounded: bool,
    pub out_of_scope: bool,
    /// 1 (unsupported) to 5 (fully supported)
    pub faithfulness_score: u8,
    pub reason: String,
}

impl VerificationResult {
    pub fn new(is_grounded: bool, out_of_scope: bool, faithfulness_score: u8, reason: impl Into<String>) -> Self {
        Self {
            is_grounded,
            out_of_scope,
            faithfulness_score: faithfulness_score.clamp(1, 5),
            reason: reason.into(),
        }
    }

    /// "Cannot confirm grounding": not grounded, out of scope, lowest score
    pub fn conservative(reason: impl Into<String>) -> Self {
        Self::new(false, true, 1, reason)
    }
}

/// Outcome of decoding a raw judge response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerdictParse {
    Parsed(VerificationResult),
    ParseFailed(String),
}

impl VerdictParse {
    /// Parsed verdict, or the conservative default for a failed decode
    pub fn or_conservative(self) -> VerificationResult {
        match self {
            Self::Parsed(verdict) => verdict,
            Self::ParseFailed(_) => VerificationResult::conservative(PARSE_FAILURE_REASON),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    is_grounded: bool,
    out_of_scope: bool,
    faithfulness_score: f64,
    #[serde(default)]
    reason: String,
}

/// Remove a surrounding Markdown fence (```` ``` ```` or ```` ```json ````)
pub fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();

    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // drop the opening fence line, including any language tag
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => "",
    };

    let body = body.trim_end();
    match body.rfind('\n') {
        Some(idx) if body[idx + 1..].trim_start().starts_with("```") => body[..idx].trim(),
        None if body.trim_start().starts_with("```") => "",
        _ => body.trim(),
    }
}

/// Decode a judge response into a verdict without ever failing
pub fn parse_verdict(raw: &str) -> VerdictParse {
    let text = strip_code_fences(raw);

    match serde_json::from_str::<RawVerdict>(text) {
        Ok(parsed) => {
            let score = parsed.faithfulness_score.round().clamp(1.0, 5.0) as u8;
            VerdictParse::Parsed(VerificationResult::new(
                parsed.is_grounded,
                parsed.out_of_scope,
                score,
                parsed.reason,
            ))
        }
        Err(_) => VerdictParse::ParseFailed(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let raw = r#"{"is_grounded": true, "out_of_scope": false, "faithfulness_score": 5, "reason": "quoted"}"#;

        assert_eq!(
            parse_verdict(raw),
            VerdictParse::Parsed(VerificationResult::new(true, false, 5, "quoted"))
        );
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"is_grounded\": false, \"out_of_scope\": false, \"faithfulness_score\": 2, \"reason\": \"extra API\"}\n```";

        let verdict = parse_verdict(raw).or_conservative();

        assert!(!verdict.is_grounded);
        assert!(!verdict.out_of_scope);
        assert_eq!(verdict.faithfulness_score, 2);
        assert_eq!(verdict.reason, "extra API");
    }

    #[test]
    fn test_non_json_falls_back_conservatively() {
        let parsed = parse_verdict("I cannot answer");
        assert_eq!(parsed, VerdictParse::ParseFailed("I cannot answer".to_string()));

        let verdict = parsed.or_conservative();
        assert!(!verdict.is_grounded);
        assert!(verdict.out_of_scope);
        assert_eq!(verdict.faithfulness_score, 1);
        assert_eq!(verdict.reason, PARSE_FAILURE_REASON);
    }

    #[test]
    fn test_missing_field_is_parse_failure() {
        let raw = r#"{"is_grounded": true, "faithfulness_score": 4}"#;
        assert!(matches!(parse_verdict(raw), VerdictParse::ParseFailed(_)));
    }

    #[test]
    fn test_score_is_clamped() {
        let raw = r#"{"is_grounded": true, "out_of_scope": false, "faithfulness_score": 9}"#;
        assert_eq!(parse_verdict(raw).or_conservative().faithfulness_score, 5);

        let raw = r#"{"is_grounded": false, "out_of_scope": true, "faithfulness_score": 0}"#;
        assert_eq!(parse_verdict(raw).or_conservative().faithfulness_score, 1);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{}"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
        assert_eq!(strip_code_fences("```"), "");
    }
}
