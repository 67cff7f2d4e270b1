//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the core engines and their
//! collaborators. Implementations live in other crates.

use crate::{CacheKey, CompressionResult};

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (brandlens-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Model identifier used for token counting and cache keys
    fn model_name(&self) -> &str;
}

/// Trait for summarization models used by the prompt compressor
///
/// Any error, empty output or output longer than the input is treated as a
/// failure by the caller.
pub trait Summarizer {
    /// Error type for summarization
    type Error;

    /// Shorten `text`, keeping roughly `ratio` of its tokens
    fn summarize(&self, text: &str, ratio: f64) -> Result<String, Self::Error>;

    /// Identity of the model, part of the compression cache key
    fn model_id(&self) -> &str;
}

/// Trait for token counting
///
/// Never fails: implementations fall back to an approximate count when the
/// model's encoding is unknown.
pub trait TokenCounter {
    /// Count tokens in `text` for `model`
    fn count_tokens(&self, text: &str, model: &str) -> usize;
}

/// Trait for the compression memo store
///
/// Entries are pure memoizations, so implementations may evict at will.
pub trait CompressionCache: Send + Sync {
    /// Look up a stored result
    fn get(&self, key: &CacheKey) -> Option<CompressionResult>;

    /// Store a result; an existing entry for the key is left untouched
    fn put(&self, key: CacheKey, value: CompressionResult);

    /// Number of live entries
    fn len(&self) -> usize;

    /// Whether the cache holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
