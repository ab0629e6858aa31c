use serde::{Deserialize, Serialize};

/// A ranked passage returned by a retriever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub content: String,
    pub source_id: String,
    /// Zero-based position in the retriever's ordering
    pub rank: usize,
}

impl RetrievedPassage {
    pub fn new(content: impl Into<String>, source_id: impl Into<String>, rank: usize) -> Self {
        Self {
            content: content.into(),
            source_id: source_id.into(),
            rank,
        }
    }

    /// File name of the source, without any directory prefix
    pub fn source_basename(&self) -> &str {
        basename(&self.source_id)
    }
}

/// Last path segment of a source identifier, accepting `/` and `\` separators
pub fn basename(source: &str) -> &str {
    source
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source)
}

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
