//! Compression results and cache keys

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the compressor did with a piece of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompressionOutcome {
    /// Under threshold, or nothing compressible; text returned unchanged
    Passthrough,
    /// The summarizer produced a shorter text
    Compressed,
    /// The summarizer failed; text returned unchanged
    Fallback {
        /// Human-readable failure reason
        reason: String,
    },
}

/// Result of one compression request
///
/// Invariant: when `used_fallback` is true, `compressed == original`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionResult {
    /// Text as given by the caller
    pub original: String,

    /// Text to send onwards
    pub compressed: String,

    /// Fraction of tokens the caller asked to keep
    pub ratio_requested: f64,

    /// `tokens(compressed) / tokens(original)`, 1.0 when nothing changed
    pub ratio_achieved: f64,

    /// Whether the summarizer failed and the original was passed through
    pub used_fallback: bool,

    /// Explicit outcome, distinguishing passthrough from fallback
    pub outcome: CompressionOutcome,
}

impl CompressionResult {
    /// Text returned unchanged because no compression was needed
    pub fn passthrough(original: impl Into<String>, ratio_requested: f64) -> Self {
        let original = original.into();
        Self {
            compressed: original.clone(),
            original,
            ratio_requested,
            ratio_achieved: 1.0,
            used_fallback: false,
            outcome: CompressionOutcome::Passthrough,
        }
    }

    /// Text returned unchanged because compression failed
    ///
    /// # Examples
    ///
    /// ```
    /// use brandlens_domain::CompressionResult;
    ///
    /// let result = CompressionResult::fallback("Why?", 0.4, "summarizer offline");
    /// assert!(result.used_fallback);
    /// assert_eq!(result.compressed, result.original);
    /// ```
    pub fn fallback(original: impl Into<String>, ratio_requested: f64, reason: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            compressed: original.clone(),
            original,
            ratio_requested,
            ratio_achieved: 1.0,
            used_fallback: true,
            outcome: CompressionOutcome::Fallback { reason: reason.into() },
        }
    }

    /// Text successfully shortened
    pub fn compressed(
        original: impl Into<String>,
        compressed: impl Into<String>,
        ratio_requested: f64,
        ratio_achieved: f64,
    ) -> Self {
        Self {
            original: original.into(),
            compressed: compressed.into(),
            ratio_requested,
            ratio_achieved,
            used_fallback: false,
            outcome: CompressionOutcome::Compressed,
        }
    }

    /// Whether the summarizer actually changed the text
    pub fn was_compressed(&self) -> bool {
        self.outcome == CompressionOutcome::Compressed
    }
}

/// Content-addressed cache key (hex digest)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wrap a precomputed digest
    pub fn from_digest(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_keeps_text() {
        let result = CompressionResult::passthrough("What is new?", 0.4);
        assert_eq!(result.compressed, "What is new?");
        assert!(!result.used_fallback);
        assert!(!result.was_compressed());
        assert_eq!(result.ratio_achieved, 1.0);
    }

    #[test]
    fn test_fallback_serializes_reason() {
        let result = CompressionResult::fallback("text", 0.4, "empty output");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"]["status"], "fallback");
        assert_eq!(json["outcome"]["reason"], "empty output");
        assert_eq!(json["used_fallback"], true);
    }

    #[test]
    fn test_compressed() {
        let result = CompressionResult::compressed("long text here", "short", 0.4, 0.35);
        assert!(result.was_compressed());
        assert_ne!(result.compressed, result.original);
    }
}
