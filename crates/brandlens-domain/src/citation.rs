//! Citation module - URLs cited inside an answer

use serde::{Deserialize, Serialize};
use std::fmt;

/// The pattern class that produced a citation
///
/// Variants are declared in priority order: a span claimed by an earlier
/// class is never re-matched by a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// `[text](url)`
    MarkdownLink,
    /// `Source[url]` / `source[url]`
    SourcePattern,
    /// `Some text[url]`
    TextUrlPattern,
    /// A bare `http(s)://` URL
    PlainUrl,
}

impl PatternType {
    /// All pattern classes, highest priority first
    pub const ALL: [PatternType; 4] = [
        PatternType::MarkdownLink,
        PatternType::SourcePattern,
        PatternType::TextUrlPattern,
        PatternType::PlainUrl,
    ];

    /// Wire name used in JSON records
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::MarkdownLink => "markdown_link",
            PatternType::SourcePattern => "source_pattern",
            PatternType::TextUrlPattern => "text_url_pattern",
            PatternType::PlainUrl => "plain_url",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A citation extracted from answer text
///
/// `start` and `end` are byte offsets into the text the citation was
/// extracted from, with `start < end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Link text, or a `Source: ...` label when the pattern carries none
    pub text: String,

    /// Cited URL (always `http://` or `https://`)
    pub url: String,

    /// Start offset of the matched span
    pub start: usize,

    /// End offset (exclusive) of the matched span
    pub end: usize,

    /// Pattern class that matched
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
}

impl Citation {
    /// Build a citation that carries only a URL, as the classifier and
    /// budget code need no positions
    ///
    /// # Examples
    ///
    /// ```
    /// use brandlens_domain::{Citation, PatternType};
    ///
    /// let c = Citation::from_url("https://tesla.com");
    /// assert_eq!(c.pattern_type, PatternType::PlainUrl);
    /// assert_eq!(c.len(), "https://tesla.com".len());
    /// ```
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            text: url.clone(),
            start: 0,
            end: url.len().max(1),
            url,
            pattern_type: PatternType::PlainUrl,
        }
    }

    /// Length of the matched span in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is empty (never true for extracted citations)
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether this citation's span intersects `[start, end)`
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_priority_order() {
        assert!(PatternType::MarkdownLink < PatternType::SourcePattern);
        assert!(PatternType::SourcePattern < PatternType::TextUrlPattern);
        assert!(PatternType::TextUrlPattern < PatternType::PlainUrl);
    }

    #[test]
    fn test_citation_serializes_type_field() {
        let citation = Citation {
            text: "Tesla".to_string(),
            url: "https://tesla.com".to_string(),
            start: 6,
            end: 33,
            pattern_type: PatternType::MarkdownLink,
        };

        let json = serde_json::to_value(&citation).unwrap();
        assert_eq!(json["type"], "markdown_link");
        assert_eq!(json["url"], "https://tesla.com");
    }

    #[test]
    fn test_overlaps() {
        let citation = Citation::from_url("https://a.io");
        assert!(citation.overlaps(0, 1));
        assert!(!citation.overlaps(citation.end, citation.end + 5));
    }
}
