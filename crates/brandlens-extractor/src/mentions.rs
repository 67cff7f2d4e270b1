//! Brand mention detection
//!
//! Linked forms (`Brand[url]`, `[Brand](url)`, joined name variants) are
//! matched first and claim their spans. Unlinked forms (`Brand`, `Brand's`)
//! are then accepted only outside claimed spans and outside any URL.

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::patterns::{ceil_boundary, floor_boundary, is_http_url, SpanClaims};
use brandlens_domain::{Citation, Mention};
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// URL-like shapes that suppress an unlinked mention containing them
static URL_LIKE: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)https?://\S+").expect("scheme url pattern is valid"),
        Regex::new(r"(?i)www\.\S+").expect("www url pattern is valid"),
        Regex::new(r"[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\S*").expect("bare host pattern is valid"),
    ]
});

/// Separators that may join the tokens of a multi-word brand
const NAME_SEPARATORS: [&str; 3] = [" ", "_", "-"];

/// Extract brand mentions with default settings
///
/// `citations` should come from the same `text`; URLs they point at are never
/// reported as unlinked mentions.
///
/// # Examples
///
/// ```
/// use brandlens_extractor::{extract_citations, extract_mentions};
///
/// let text = "Tesla[https://tesla.com] makes cars. Tesla is innovative.";
/// let citations = extract_citations(text);
/// let mentions = extract_mentions(text, "Tesla", &citations);
///
/// assert_eq!(mentions.len(), 2);
/// assert!(mentions[0].is_linked());
/// assert!(!mentions[1].is_linked());
/// ```
pub fn extract_mentions(text: &str, brand_name: &str, citations: &[Citation]) -> Vec<Mention> {
    MentionExtractor::new(ExtractorConfig::default()).extract(text, brand_name, citations)
}

/// Brand mention extractor
#[derive(Debug, Clone, Default)]
pub struct MentionExtractor {
    config: ExtractorConfig,
}

impl MentionExtractor {
    /// Create an extractor from configuration
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extract mentions ordered by position
    ///
    /// Never fails: an empty brand or a brand whose patterns cannot be
    /// compiled yields no mentions.
    pub fn extract(&self, text: &str, brand_name: &str, citations: &[Citation]) -> Vec<Mention> {
        let brand = brand_name.trim();
        if brand.is_empty() || text.is_empty() {
            return Vec::new();
        }

        let patterns = match BrandPatterns::compile(brand) {
            Ok(patterns) => patterns,
            Err(e) => {
                warn!("Skipping mention extraction: {}", e);
                return Vec::new();
            }
        };

        let mut claims = SpanClaims::new();
        let mut mentions = Vec::new();

        for regex in patterns.linked() {
            for caps in regex.captures_iter(text) {
                let (Some(whole), Some(name), Some(url)) = (caps.get(0), caps.name("name"), caps.name("url"))
                else {
                    continue;
                };
                let url = url.as_str().trim();
                if !is_http_url(url) {
                    continue;
                }
                if claims.claim(whole.start(), whole.end()) {
                    mentions.push(Mention::linked(brand, name.as_str(), whole.start(), whole.end(), url));
                }
            }
        }

        let citation_urls = citation_url_spans(text, citations);

        for m in patterns.unlinked.find_iter(text) {
            let (start, end) = (m.start(), m.end());
            if claims.overlaps(start, end) {
                continue;
            }
            if citation_urls.iter().any(|&(s, e)| s <= start && start < e) {
                continue;
            }
            if self.inside_url(text, start, end) {
                continue;
            }
            if claims.claim(start, end) {
                mentions.push(Mention::unlinked(brand, m.as_str(), start, end));
            }
        }

        mentions.sort_by_key(|m| m.start);
        debug!(
            "Extracted {} mentions of '{}' ({} linked)",
            mentions.len(),
            brand,
            mentions.iter().filter(|m| m.is_linked()).count()
        );
        mentions
    }

    /// Whether a URL-like match found near `[start, end)` contains `start`
    fn inside_url(&self, text: &str, start: usize, end: usize) -> bool {
        let window = self.config.url_proximity_window;
        let context_start = floor_boundary(text, start.saturating_sub(window));
        let context_end = ceil_boundary(text, end.saturating_add(window));
        let context = &text[context_start..context_end];

        URL_LIKE.iter().any(|regex| {
            regex.find_iter(context).any(|url| {
                let url_start = context_start + url.start();
                let url_end = context_start + url.end();
                url_start <= start && start < url_end
            })
        })
    }
}

/// Byte spans of each citation's URL inside `text`
fn citation_url_spans(text: &str, citations: &[Citation]) -> Vec<(usize, usize)> {
    citations
        .iter()
        .filter_map(|c| {
            let span = text.get(c.start..c.end)?;
            let offset = span.rfind(c.url.as_str())?;
            let start = c.start + offset;
            Some((start, start + c.url.len()))
        })
        .collect()
}

/// Compiled patterns for one brand name
struct BrandPatterns {
    bracketed: Regex,
    markdown: Regex,
    variants: Vec<Regex>,
    unlinked: Regex,
}

impl BrandPatterns {
    fn compile(brand: &str) -> Result<Self, ExtractorError> {
        let escaped = regex::escape(brand);
        let (pre, post) = word_boundaries(brand);

        let bracketed = build(brand, &format!(r"(?P<name>{pre}{escaped}{post})\[(?P<url>[^\]]+)\]"))?;
        let markdown = build(brand, &format!(r"\[\s*(?P<name>{escaped})\s*\]\((?P<url>[^)]+)\)"))?;

        let variants = name_variants(brand)
            .into_iter()
            .map(|variant| {
                let escaped = regex::escape(&variant);
                let (pre, post) = word_boundaries(&variant);
                build(brand, &format!(r"(?P<name>{pre}{escaped}{post})\[(?P<url>[^\]]+)\]"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Possessive is tried first so `Brand's` wins over `Brand` at the same offset
        let unlinked = build(brand, &format!(r"{pre}{escaped}(?:['’]s\b|{post})"))?;

        Ok(Self {
            bracketed,
            markdown,
            variants,
            unlinked,
        })
    }

    /// Linked patterns in priority order
    fn linked(&self) -> impl Iterator<Item = &Regex> {
        [&self.bracketed, &self.markdown]
            .into_iter()
            .chain(self.variants.iter())
    }
}

fn build(brand: &str, pattern: &str) -> Result<Regex, ExtractorError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ExtractorError::Pattern {
            brand: brand.to_string(),
            reason: e.to_string(),
        })
}

/// `\b` on each edge of `name` that is a word character
fn word_boundaries(name: &str) -> (&'static str, &'static str) {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let pre = if is_word(name.chars().next()) { r"\b" } else { "" };
    let post = if is_word(name.chars().next_back()) { r"\b" } else { "" };
    (pre, post)
}

/// Spellings of a multi-token brand joined by each separator, excluding the
/// brand itself
fn name_variants(brand: &str) -> Vec<String> {
    let tokens: Vec<&str> = brand
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() < 2 {
        return Vec::new();
    }

    let mut variants: Vec<String> = Vec::new();
    for separator in NAME_SEPARATORS {
        let variant = tokens.join(separator);
        if !variant.eq_ignore_ascii_case(brand) && !variants.iter().any(|v| v.eq_ignore_ascii_case(&variant)) {
            variants.push(variant);
        }
    }
    variants
}
