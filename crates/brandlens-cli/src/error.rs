//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No API key in the config file, the environment or the arguments
    #[error("OPENAI_API_KEY not set. Export it or add api_key to {0}")]
    MissingApiKey(String),

    /// LLM error
    #[error("Model call failed: {0}")]
    Llm(#[from] brandlens_llm::LlmError),

    /// Compressor configuration error
    #[error(transparent)]
    Compressor(#[from] brandlens_compressor::CompressorError),

    /// Extractor configuration error
    #[error(transparent)]
    Extractor(#[from] brandlens_extractor::ExtractorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Background task failed
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
