//! Configuration for prompt compression
//!
//! Controls when the background of a question is summarized, how hard, and
//! how long summaries are remembered.

use crate::error::CompressorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the prompt compressor
///
/// # Examples
///
/// ```
/// use brandlens_compressor::CompressorConfig;
///
/// // Default configuration (compress backgrounds over 120 tokens)
/// let config = CompressorConfig::default();
/// assert_eq!(config.token_threshold, 120);
///
/// // Aggressive compression
/// let config = CompressorConfig::aggressive();
/// assert_eq!(config.token_threshold, 10);
///
/// // Lenient compression
/// let config = CompressorConfig::lenient();
/// assert!(config.ratio > CompressorConfig::default().ratio);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressorConfig {
    /// Token count above which a segment is summarized
    /// Default: 120
    pub token_threshold: usize,

    /// Fraction of tokens the summary should keep (0.0, 1.0]
    /// Default: 0.4
    pub ratio: f64,

    /// Lower bound on summary length in words, handed to summarizers
    /// Default: 20
    #[serde(default = "default_min_summary_words")]
    pub min_summary_words: usize,

    /// How long cached summaries stay valid (None = forever)
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,

    /// Upper bound on cached summaries (None = unbounded)
    #[serde(default)]
    pub cache_max_entries: Option<usize>,
}

fn default_min_summary_words() -> usize {
    20
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            token_threshold: 120,
            ratio: 0.4,
            min_summary_words: default_min_summary_words(),
            cache_ttl_secs: None,
            cache_max_entries: Some(1024),
        }
    }
}

impl CompressorConfig {
    /// Aggressive compression (almost any background is summarized hard)
    ///
    /// - Threshold: 10 tokens
    /// - Ratio: 0.2
    pub fn aggressive() -> Self {
        Self {
            token_threshold: 10,
            ratio: 0.2,
            min_summary_words: 10,
            ..Self::default()
        }
    }

    /// Lenient compression (only very long backgrounds, gently)
    ///
    /// - Threshold: 400 tokens
    /// - Ratio: 0.6
    pub fn lenient() -> Self {
        Self {
            token_threshold: 400,
            ratio: 0.6,
            min_summary_words: 40,
            ..Self::default()
        }
    }

    /// Cache TTL as Duration
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), CompressorError> {
        if !(self.ratio > 0.0 && self.ratio <= 1.0) {
            return Err(CompressorError::Config(format!(
                "ratio must be in (0.0, 1.0], got {}",
                self.ratio
            )));
        }
        if self.cache_max_entries == Some(0) {
            return Err(CompressorError::Config(
                "cache_max_entries must be greater than 0 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, CompressorError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, CompressorError> {
        toml::to_string_pretty(self)
            .map_err(|e| CompressorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}
