//! Source ownership types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Ownership of a single cited URL relative to a brand domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    /// Same domain as the brand, or a subdomain of it
    Owned,
    /// Any other domain
    External,
}

/// Why a URL's domain could not be determined
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The URL could not be parsed at all
    Unparseable(String),
    /// The URL parsed but carries no host
    MissingHost(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::Unparseable(url) => write!(f, "unparseable URL: {}", url),
            DomainError::MissingHost(url) => write!(f, "URL has no host: {}", url),
        }
    }
}

impl std::error::Error for DomainError {}

/// Unique citation URLs partitioned into owned and external
///
/// Both lists keep first-seen order and never share a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSet {
    /// URLs on the brand's domain
    pub owned: Vec<String>,

    /// Every other URL
    pub external: Vec<String>,
}

impl SourceSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a URL under the given ownership
    ///
    /// Returns `false` if the URL was already recorded (in either list).
    pub fn insert(&mut self, url: &str, ownership: Ownership) -> bool {
        if self.contains(url) {
            return false;
        }
        match ownership {
            Ownership::Owned => self.owned.push(url.to_string()),
            Ownership::External => self.external.push(url.to_string()),
        }
        true
    }

    /// Whether the URL is recorded in either list
    pub fn contains(&self, url: &str) -> bool {
        self.owned.iter().chain(self.external.iter()).any(|u| u == url)
    }

    /// Total number of unique URLs
    pub fn len(&self) -> usize {
        self.owned.len() + self.external.len()
    }

    /// Whether no URL was recorded
    pub fn is_empty(&self) -> bool {
        self.owned.is_empty() && self.external.is_empty()
    }

    /// All URLs, owned first
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.owned.iter().chain(self.external.iter()).map(String::as_str)
    }

    /// Check the partition invariant: no URL appears twice anywhere
    pub fn is_disjoint(&self) -> bool {
        let mut seen = HashSet::new();
        self.all().all(|url| seen.insert(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_deduplicates_across_lists() {
        let mut set = SourceSet::new();
        assert!(set.insert("https://tesla.com", Ownership::Owned));
        assert!(!set.insert("https://tesla.com", Ownership::External));
        assert_eq!(set.owned.len(), 1);
        assert!(set.external.is_empty());
        assert!(set.is_disjoint());
    }

    #[test]
    fn test_len_and_all() {
        let mut set = SourceSet::new();
        set.insert("https://reuters.com", Ownership::External);
        set.insert("https://blog.tesla.com", Ownership::Owned);

        assert_eq!(set.len(), 2);
        let all: Vec<_> = set.all().collect();
        assert_eq!(all, vec!["https://blog.tesla.com", "https://reuters.com"]);
    }

    #[test]
    fn test_domain_error_display() {
        let err = DomainError::MissingHost("file:///tmp".to_string());
        assert!(err.to_string().contains("no host"));
    }
}
