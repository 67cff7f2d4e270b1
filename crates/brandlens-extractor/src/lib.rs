//! Brandlens Extractor
//!
//! Pulls structured signal out of free-form LLM answers.
//!
//! # Overview
//!
//! Given an answer, a brand name and the brand's website, the extractor finds
//! every cited URL, every mention of the brand and whether each cited source
//! belongs to the brand. All operations are pure functions over their inputs:
//! malformed text yields fewer results, never an error.
//!
//! # Architecture
//!
//! ```text
//! answer ──► PatternMatcher ──► CitationExtractor ──► citations
//! answer + brand + citations ──► MentionExtractor ──► mentions
//! citations + brand_url ──► SourceClassifier ──► { owned, external }
//! citations + budget ──► SearchUsage
//! ```
//!
//! # Example Usage
//!
//! ```
//! use brandlens_extractor::{analyze_response, Budget};
//!
//! let answer = "Check [Tesla](https://tesla.com) and https://reuters.com/news. Tesla's lead grows.";
//! let report = analyze_response(answer, "Tesla", "https://tesla.com", Budget::default());
//!
//! assert_eq!(report.citations.len(), 2);
//! assert_eq!(report.sources.owned, vec!["https://tesla.com"]);
//! assert_eq!(report.linked_mentions(), 1);
//! assert_eq!(report.unlinked_mentions(), 1);
//! ```

#![warn(missing_docs)]

mod analysis;
mod citations;
mod config;
mod error;
mod mentions;
mod patterns;
mod sources;
mod usage;

#[cfg(test)]
mod tests;

pub use analysis::{analyze_response, AnalysisReport, ResponseAnalyzer};
pub use citations::{extract_citations, CitationExtractor};
pub use config::{ExtractorConfig, CITATION_LABEL_CHARS, URL_PROXIMITY_WINDOW};
pub use error::ExtractorError;
pub use mentions::{extract_mentions, MentionExtractor};
pub use patterns::{is_http_url, Candidate, CitationRule, PatternMatcher, SpanClaims};
pub use sources::{brand_domain, classify_source, classify_sources, normalize_domain, SourceClassifier};
pub use usage::{Budget, SearchUsage};
