//! Error types for the extraction engine
//!
//! Extraction itself never fails; these cover configuration and the
//! per-brand pattern compilation that callers may want to inspect.

use thiserror::Error;

/// Errors that can occur while configuring extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A brand-specific pattern could not be compiled
    #[error("Pattern error for brand '{brand}': {reason}")]
    Pattern {
        /// Brand name the pattern was built from
        brand: String,
        /// Compiler message
        reason: String,
    },
}

impl From<toml::de::Error> for ExtractorError {
    fn from(e: toml::de::Error) -> Self {
        ExtractorError::Config(format!("Failed to parse TOML: {}", e))
    }
}
