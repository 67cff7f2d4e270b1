//! Configuration for the extraction engine

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};

/// Bytes scanned on each side of an unlinked mention when looking for a URL
/// that contains it
pub const URL_PROXIMITY_WINDOW: usize = 50;

/// Characters of the URL kept in `Source: ...` labels
pub const CITATION_LABEL_CHARS: usize = 50;

/// Configuration for citation and mention extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Window (bytes before and after) searched for URL-like text around an
    /// unlinked mention candidate
    #[serde(default = "default_window")]
    pub url_proximity_window: usize,

    /// URL prefix length used in generated citation labels
    #[serde(default = "default_label_chars")]
    pub citation_label_chars: usize,
}

fn default_window() -> usize {
    URL_PROXIMITY_WINDOW
}

fn default_label_chars() -> usize {
    CITATION_LABEL_CHARS
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            url_proximity_window: URL_PROXIMITY_WINDOW,
            citation_label_chars: CITATION_LABEL_CHARS,
        }
    }
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.url_proximity_window == 0 {
            return Err(ExtractorError::Config(
                "url_proximity_window must be greater than 0".to_string(),
            ));
        }
        if self.citation_label_chars == 0 {
            return Err(ExtractorError::Config(
                "citation_label_chars must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}
