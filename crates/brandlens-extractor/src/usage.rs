//! Search and source budget accounting
//!
//! A "search" is a unique domain, a "source" is a unique URL. Exceeding the
//! budget is reported, never enforced.

use crate::sources::normalize_domain;
use brandlens_domain::Citation;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Search and source limits given to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Maximum unique domains
    pub max_searches: usize,
    /// Maximum unique URLs
    pub max_sources: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_searches: 3,
            max_sources: 6,
        }
    }
}

/// How much of the budget an answer used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchUsage {
    /// Limit on unique domains
    pub max_searches: usize,
    /// Limit on unique URLs
    pub max_sources: usize,
    /// Unique domains cited
    pub searches_used: usize,
    /// Unique URLs cited
    pub sources_used: usize,
    /// Negative when over budget
    pub searches_remaining: i64,
    /// Negative when over budget
    pub sources_remaining: i64,
    /// Both limits respected
    pub budget_respected: bool,
    /// Sources per search
    pub search_efficiency: f64,
    /// The unique domains, sorted
    pub unique_domains: Vec<String>,
}

impl SearchUsage {
    /// Account for the citations of one answer
    ///
    /// URLs whose domain cannot be parsed count as sources but not searches.
    pub fn from_citations(citations: &[Citation], budget: Budget) -> Self {
        let unique_urls: HashSet<&str> = citations.iter().map(|c| c.url.as_str()).collect();
        let unique_domains: BTreeSet<String> = unique_urls
            .iter()
            .filter_map(|url| normalize_domain(url).ok())
            .collect();

        let searches_used = unique_domains.len();
        let sources_used = unique_urls.len();

        Self {
            max_searches: budget.max_searches,
            max_sources: budget.max_sources,
            searches_used,
            sources_used,
            searches_remaining: budget.max_searches as i64 - searches_used as i64,
            sources_remaining: budget.max_sources as i64 - sources_used as i64,
            budget_respected: searches_used <= budget.max_searches && sources_used <= budget.max_sources,
            search_efficiency: sources_used as f64 / searches_used.max(1) as f64,
            unique_domains: unique_domains.into_iter().collect(),
        }
    }
}
