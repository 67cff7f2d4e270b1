//! Owned vs external source classification

use brandlens_domain::{Citation, DomainError, Ownership, SourceSet};
use tracing::debug;
use url::Url;

/// Classify citation URLs against the brand's website
///
/// # Examples
///
/// ```
/// use brandlens_domain::Citation;
/// use brandlens_extractor::classify_sources;
///
/// let citations = vec![
///     Citation::from_url("https://blog.tesla.com"),
///     Citation::from_url("https://reuters.com"),
/// ];
/// let sources = classify_sources(&citations, "https://tesla.com");
///
/// assert_eq!(sources.owned, vec!["https://blog.tesla.com"]);
/// assert_eq!(sources.external, vec!["https://reuters.com"]);
/// ```
pub fn classify_sources(citations: &[Citation], brand_url: &str) -> SourceSet {
    SourceClassifier::new(brand_url).classify_all(citations)
}

/// Normalized host of `url`: lowercase, no leading `www.`, no trailing dot
pub fn normalize_domain(url: &str) -> Result<String, DomainError> {
    let parsed = Url::parse(url.trim()).map_err(|_| DomainError::Unparseable(url.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| DomainError::MissingHost(url.to_string()))?
        .to_lowercase();
    let host = host.trim_end_matches('.');
    let host = host.strip_prefix("www.").unwrap_or(host);

    if host.is_empty() {
        return Err(DomainError::MissingHost(url.to_string()));
    }
    Ok(host.to_string())
}

/// Normalized brand domain; a bare `tesla.com` is read as `https://tesla.com`
pub fn brand_domain(brand_url: &str) -> Result<String, DomainError> {
    let trimmed = brand_url.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Unparseable(brand_url.to_string()));
    }
    if trimmed.contains("://") {
        normalize_domain(trimmed)
    } else {
        normalize_domain(&format!("https://{}", trimmed))
    }
}

/// Classify one URL against an already-normalized brand domain
pub fn classify_source(url: &str, brand_domain: &str) -> Result<Ownership, DomainError> {
    let domain = normalize_domain(url)?;
    if is_same_site(&domain, brand_domain) {
        Ok(Ownership::Owned)
    } else {
        Ok(Ownership::External)
    }
}

fn is_same_site(domain: &str, brand_domain: &str) -> bool {
    if brand_domain.is_empty() {
        return false;
    }
    domain == brand_domain
        || domain
            .strip_suffix(brand_domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Classifier bound to one brand
#[derive(Debug, Clone)]
pub struct SourceClassifier {
    brand_domain: Option<String>,
}

impl SourceClassifier {
    /// Create a classifier; an unusable brand URL makes every source external
    pub fn new(brand_url: &str) -> Self {
        let brand_domain = match brand_domain(brand_url) {
            Ok(domain) => Some(domain),
            Err(e) => {
                debug!("Brand URL not usable for ownership, all sources external: {}", e);
                None
            }
        };
        Self { brand_domain }
    }

    /// Normalized brand domain, if the brand URL was usable
    pub fn brand_domain(&self) -> Option<&str> {
        self.brand_domain.as_deref()
    }

    /// Ownership of one URL; unparseable URLs are external
    pub fn classify(&self, url: &str) -> Ownership {
        let Some(brand) = self.brand_domain.as_deref() else {
            return Ownership::External;
        };
        match classify_source(url, brand) {
            Ok(ownership) => ownership,
            Err(e) => {
                debug!("Classifying as external: {}", e);
                Ownership::External
            }
        }
    }

    /// Partition unique citation URLs into owned and external
    pub fn classify_all(&self, citations: &[Citation]) -> SourceSet {
        let mut sources = SourceSet::new();
        for citation in citations {
            if sources.contains(&citation.url) {
                continue;
            }
            sources.insert(&citation.url, self.classify(&citation.url));
        }
        sources
    }
}
