//! Layered citation patterns and interval claiming
//!
//! Each [`CitationRule`] produces candidate spans. Rules are visited in
//! priority order and a candidate is kept only if its span does not overlap a
//! span claimed by an earlier candidate.

use brandlens_domain::PatternType;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("markdown link pattern is valid")
});

static SOURCE_BRACKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)source\[([^\]]+)\]").expect("source bracket pattern is valid")
});

static TEXT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+(?:\s+\w+)*)\[([^\]]+)\]").expect("text url pattern is valid")
});

static PLAIN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s)\]<>"]+"#).expect("plain url pattern is valid")
});

/// Characters trimmed from the end of a bare URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', '\'', '"'];

/// Whether `url` has an accepted scheme and something after it
pub fn is_http_url(url: &str) -> bool {
    ["https://", "http://"]
        .iter()
        .any(|scheme| url.len() > scheme.len() && url.starts_with(scheme))
}

/// Set of disjoint, claimed byte spans
#[derive(Debug, Default, Clone)]
pub struct SpanClaims {
    // start -> end, disjoint, so ends increase with starts
    spans: BTreeMap<usize, usize>,
}

impl SpanClaims {
    /// Create an empty claim set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `[start, end)` intersects any claimed span
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.spans
            .range(..end)
            .next_back()
            .is_some_and(|(_, &claimed_end)| claimed_end > start)
    }

    /// Claim `[start, end)` unless it overlaps an existing claim
    ///
    /// Returns whether the span was claimed.
    pub fn claim(&mut self, start: usize, end: usize) -> bool {
        if start >= end || self.overlaps(start, end) {
            return false;
        }
        self.spans.insert(start, end);
        true
    }

    /// Number of claimed spans
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether nothing has been claimed
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// A structural match that survived overlap resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Pattern class that produced it
    pub pattern_type: PatternType,
    /// Span start
    pub start: usize,
    /// Span end (exclusive)
    pub end: usize,
    /// Link text, where the pattern has one
    pub text: Option<String>,
    /// URL as captured, already trimmed
    pub url: String,
}

/// One pattern class and the regex that drives it
pub struct CitationRule {
    pattern_type: PatternType,
    regex: &'static Regex,
}

impl CitationRule {
    /// Rule for the given pattern class
    pub fn for_type(pattern_type: PatternType) -> Self {
        let regex: &'static Regex = match pattern_type {
            PatternType::MarkdownLink => &MARKDOWN_LINK,
            PatternType::SourcePattern => &SOURCE_BRACKET,
            PatternType::TextUrlPattern => &TEXT_URL,
            PatternType::PlainUrl => &PLAIN_URL,
        };
        Self { pattern_type, regex }
    }

    /// Pattern class of this rule
    pub fn pattern_type(&self) -> PatternType {
        self.pattern_type
    }

    /// Raw matches of this rule, in text order, before overlap resolution
    fn raw_matches(&self, text: &str) -> Vec<Candidate> {
        match self.pattern_type {
            PatternType::MarkdownLink | PatternType::TextUrlPattern => self
                .regex
                .captures_iter(text)
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    Some(Candidate {
                        pattern_type: self.pattern_type,
                        start: whole.start(),
                        end: whole.end(),
                        text: Some(caps.get(1)?.as_str().trim().to_string()),
                        url: caps.get(2)?.as_str().trim().to_string(),
                    })
                })
                .collect(),
            PatternType::SourcePattern => self
                .regex
                .captures_iter(text)
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    Some(Candidate {
                        pattern_type: self.pattern_type,
                        start: whole.start(),
                        end: whole.end(),
                        text: None,
                        url: caps.get(1)?.as_str().trim().to_string(),
                    })
                })
                .collect(),
            PatternType::PlainUrl => self
                .regex
                .find_iter(text)
                .filter_map(|m| {
                    let url = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
                    if url.is_empty() {
                        return None;
                    }
                    Some(Candidate {
                        pattern_type: self.pattern_type,
                        start: m.start(),
                        end: m.start() + url.len(),
                        text: None,
                        url: url.to_string(),
                    })
                })
                .collect(),
        }
    }
}

/// Ordered list of citation rules
pub struct PatternMatcher {
    rules: Vec<CitationRule>,
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternMatcher {
    /// Matcher with the four standard rules in priority order
    pub fn new() -> Self {
        Self {
            rules: PatternType::ALL.into_iter().map(CitationRule::for_type).collect(),
        }
    }

    /// Rules in the order they are applied
    pub fn rules(&self) -> &[CitationRule] {
        &self.rules
    }

    /// Resolve all rules into non-overlapping candidates
    ///
    /// Candidates are returned in priority order, then text order. Every
    /// surviving structural match claims its span, even when its URL will later
    /// be rejected, so a bare URL inside `[text](url)` is never re-matched.
    pub fn candidates(&self, text: &str) -> Vec<Candidate> {
        let mut claims = SpanClaims::new();
        let mut resolved = Vec::new();

        for rule in &self.rules {
            for candidate in rule.raw_matches(text) {
                if claims.claim(candidate.start, candidate.end) {
                    resolved.push(candidate);
                }
            }
        }

        resolved
    }
}

/// Largest char boundary `<= index`
pub(crate) fn floor_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Smallest char boundary `>= index`
pub(crate) fn ceil_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// First `max_chars` characters of `text`
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_claims_reject_overlap() {
        let mut claims = SpanClaims::new();
        assert!(claims.claim(10, 20));
        assert!(!claims.claim(15, 25));
        assert!(!claims.claim(5, 11));
        assert!(!claims.claim(12, 14));
        assert!(claims.claim(20, 30));
        assert!(claims.claim(0, 10));
        assert_eq!(claims.len(), 3);
    }

    #[test]
    fn test_span_claims_reject_empty_span() {
        let mut claims = SpanClaims::new();
        assert!(!claims.claim(4, 4));
        assert!(claims.is_empty());
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://tesla.com"));
        assert!(is_http_url("http://tesla.com"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("ftp://tesla.com"));
        assert!(!is_http_url("tesla.com"));
    }

    #[test]
    fn test_markdown_link_claims_inner_url() {
        let matcher = PatternMatcher::new();
        let candidates = matcher.candidates("See [Docs](https://a.io/docs) now");

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].pattern_type, PatternType::MarkdownLink);
        assert_eq!(candidates[0].text.as_deref(), Some("Docs"));
    }

    #[test]
    fn test_source_pattern_beats_text_url() {
        let matcher = PatternMatcher::new();
        let candidates = matcher.candidates("details here: Source[https://a.io]");

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].pattern_type, PatternType::SourcePattern);
        assert_eq!(candidates[0].url, "https://a.io");
    }

    #[test]
    fn test_source_keyword_case_insensitive() {
        let matcher = PatternMatcher::new();
        let candidates = matcher.candidates("(SOURCE[https://a.io])");
        assert_eq!(candidates[0].pattern_type, PatternType::SourcePattern);
    }

    #[test]
    fn test_plain_url_trailing_punctuation_trimmed() {
        let matcher = PatternMatcher::new();
        let text = "Read https://a.io/report-2023.";
        let candidates = matcher.candidates(text);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "https://a.io/report-2023");
        assert_eq!(&text[candidates[0].start..candidates[0].end], "https://a.io/report-2023");
    }

    #[test]
    fn test_unbalanced_brackets_are_skipped() {
        let matcher = PatternMatcher::new();
        let candidates = matcher.candidates("Broken [link(https://a.io and Tesla[https://b.io");

        // Only the bare URLs survive; neither bracket form closes
        assert!(candidates.iter().all(|c| c.pattern_type == PatternType::PlainUrl));
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_boundaries_on_multibyte_text() {
        let text = "héllo";
        assert_eq!(floor_boundary(text, 2), 1);
        assert_eq!(ceil_boundary(text, 2), 3);
        assert_eq!(floor_boundary(text, 100), text.len());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("ab", 3), "ab");
        assert_eq!(truncate_chars("ééé", 2), "éé");
    }
}
