//! Error types for the prompt compressor

use thiserror::Error;

/// Errors that can occur while configuring compression
///
/// Compression itself never fails: summarizer problems end in a fallback
/// result instead.
#[derive(Error, Debug)]
pub enum CompressorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for CompressorError {
    fn from(e: toml::de::Error) -> Self {
        CompressorError::Config(format!("Failed to parse TOML: {}", e))
    }
}
