//! One-call analysis of an LLM answer

use crate::citations::CitationExtractor;
use crate::config::ExtractorConfig;
use crate::mentions::MentionExtractor;
use crate::sources::SourceClassifier;
use crate::usage::{Budget, SearchUsage};
use brandlens_domain::{Citation, Mention, SourceSet};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything extracted from one answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Unique citations in text order
    pub citations: Vec<Citation>,
    /// Brand mentions in text order
    pub mentions: Vec<Mention>,
    /// Citation URLs split by ownership
    pub sources: SourceSet,
    /// Budget accounting
    pub usage: SearchUsage,
}

impl AnalysisReport {
    /// Number of linked mentions
    pub fn linked_mentions(&self) -> usize {
        self.mentions.iter().filter(|m| m.is_linked()).count()
    }

    /// Number of unlinked mentions
    pub fn unlinked_mentions(&self) -> usize {
        self.mentions.len() - self.linked_mentions()
    }
}

/// Analyze `text` for `brand_name` with default settings
pub fn analyze_response(text: &str, brand_name: &str, brand_url: &str, budget: Budget) -> AnalysisReport {
    ResponseAnalyzer::default().analyze(text, brand_name, brand_url, budget)
}

/// Runs citation, mention, source and budget extraction together
pub struct ResponseAnalyzer {
    citations: CitationExtractor,
    mentions: MentionExtractor,
}

impl Default for ResponseAnalyzer {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl ResponseAnalyzer {
    /// Create an analyzer from configuration
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            citations: CitationExtractor::new(&config),
            mentions: MentionExtractor::new(config),
        }
    }

    /// Analyze one answer
    pub fn analyze(&self, text: &str, brand_name: &str, brand_url: &str, budget: Budget) -> AnalysisReport {
        let citations = self.citations.extract(text);
        let mentions = self.mentions.extract(text, brand_name, &citations);
        let sources = SourceClassifier::new(brand_url).classify_all(&citations);
        let usage = SearchUsage::from_citations(&citations, budget);

        let report = AnalysisReport {
            citations,
            mentions,
            sources,
            usage,
        };

        info!(
            "Analysis for '{}': {} citations, {} mentions ({} linked), {} owned / {} external sources",
            brand_name,
            report.citations.len(),
            report.mentions.len(),
            report.linked_mentions(),
            report.sources.owned.len(),
            report.sources.external.len()
        );

        report
    }
}
