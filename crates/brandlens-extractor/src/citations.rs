//! Citation extraction

use crate::config::ExtractorConfig;
use crate::patterns::{is_http_url, truncate_chars, PatternMatcher};
use brandlens_domain::{Citation, PatternType};
use std::collections::HashSet;
use tracing::debug;

/// Extract all unique citations from `text` with default settings
///
/// # Examples
///
/// ```
/// use brandlens_extractor::extract_citations;
/// use brandlens_domain::PatternType;
///
/// let citations = extract_citations("Check [Tesla](https://tesla.com) and https://reuters.com/news");
/// assert_eq!(citations.len(), 2);
/// assert_eq!(citations[0].pattern_type, PatternType::MarkdownLink);
/// assert_eq!(citations[1].url, "https://reuters.com/news");
/// ```
pub fn extract_citations(text: &str) -> Vec<Citation> {
    CitationExtractor::default().extract(text)
}

/// Turns matcher candidates into a deduplicated citation list
pub struct CitationExtractor {
    matcher: PatternMatcher,
    label_chars: usize,
}

impl Default for CitationExtractor {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl CitationExtractor {
    /// Create an extractor from configuration
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            matcher: PatternMatcher::new(),
            label_chars: config.citation_label_chars,
        }
    }

    /// Extract citations ordered by position
    ///
    /// Each distinct URL appears once, attributed to the highest-priority
    /// pattern that matched it. Non-HTTP URLs and malformed brackets are
    /// dropped silently.
    pub fn extract(&self, text: &str) -> Vec<Citation> {
        let mut found_urls = HashSet::new();
        let mut citations = Vec::new();

        for candidate in self.matcher.candidates(text) {
            if !is_http_url(&candidate.url) {
                continue;
            }
            if !found_urls.insert(candidate.url.clone()) {
                continue;
            }

            let label = match (candidate.pattern_type, candidate.text) {
                (PatternType::MarkdownLink | PatternType::TextUrlPattern, Some(text)) => text,
                _ => self.label(&candidate.url),
            };

            citations.push(Citation {
                text: label,
                url: candidate.url,
                start: candidate.start,
                end: candidate.end,
                pattern_type: candidate.pattern_type,
            });
        }

        citations.sort_by_key(|c| c.start);
        debug!("Extracted {} citations", citations.len());
        citations
    }

    fn label(&self, url: &str) -> String {
        format!("Source: {}...", truncate_chars(url, self.label_chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_and_plain_url() {
        let citations = extract_citations("Check [Tesla](https://tesla.com) and https://reuters.com/news");

        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].text, "Tesla");
        assert_eq!(citations[0].url, "https://tesla.com");
        assert_eq!(citations[0].pattern_type, PatternType::MarkdownLink);
        assert_eq!(citations[1].url, "https://reuters.com/news");
        assert_eq!(citations[1].pattern_type, PatternType::PlainUrl);
    }

    #[test]
    fn test_duplicate_url_keeps_highest_priority() {
        let text = "https://tesla.com/about first, then Source[https://tesla.com/about] and [About](https://tesla.com/about)";
        let citations = extract_citations(text);

        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].pattern_type, PatternType::MarkdownLink);
    }

    #[test]
    fn test_output_ordered_by_position() {
        let text = "Source[https://a.io], [B](https://b.io), Brand[https://c.io]";
        let citations = extract_citations(text);

        let urls: Vec<_> = citations.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.io", "https://b.io", "https://c.io"]);
        assert_eq!(citations[2].pattern_type, PatternType::TextUrlPattern);
        assert_eq!(citations[2].text, "Brand");
    }

    #[test]
    fn test_non_http_urls_ignored() {
        let citations = extract_citations("See [docs](/local/path) and Brand[ftp://files.io] and [x](mailto:a@b.io)");
        assert!(citations.is_empty());
    }

    #[test]
    fn test_non_http_markdown_still_claims_span() {
        // The bare URL lives inside a rejected link and must not resurface
        let citations = extract_citations("[see](note https://a.io)");
        assert!(citations.is_empty());
    }

    #[test]
    fn test_source_label_is_truncated() {
        let url = format!("https://example.com/{}", "a".repeat(80));
        let citations = extract_citations(&format!("source[{}]", url));

        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].text, format!("Source: {}...", &url[..50]));
    }

    #[test]
    fn test_spans_cover_matched_text() {
        let text = "Intro. Tesla[https://tesla.com/cybertruck] ships.";
        let citations = extract_citations(text);

        let c = &citations[0];
        assert_eq!(&text[c.start..c.end], "Tesla[https://tesla.com/cybertruck]");
        assert!(c.start < c.end);
    }

    #[test]
    fn test_empty_text() {
        assert!(extract_citations("").is_empty());
    }
}
