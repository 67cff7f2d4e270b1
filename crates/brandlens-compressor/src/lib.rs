//! Brandlens Compressor
//!
//! Shrinks long brand questions before they are sent to a model, without
//! touching the question itself.
//!
//! # Overview
//!
//! A question is split into background (head) and tail: the last sentence
//! ending in `?` plus the one before it. Only a background over the token
//! threshold is summarized. Summaries are memoized in a content-addressed
//! cache, and any summarizer failure falls back to the original text.
//!
//! # Example Usage
//!
//! ```
//! use brandlens_compressor::{CompressorConfig, PromptCompressor};
//! use brandlens_domain::{Summarizer, TokenCounter};
//!
//! struct Words;
//! impl TokenCounter for Words {
//!     fn count_tokens(&self, text: &str, _model: &str) -> usize {
//!         text.split_whitespace().count()
//!     }
//! }
//!
//! struct FirstWords;
//! impl Summarizer for FirstWords {
//!     type Error = String;
//!     fn summarize(&self, text: &str, _ratio: f64) -> Result<String, String> {
//!         Ok(text.split_whitespace().take(3).collect::<Vec<_>>().join(" "))
//!     }
//!     fn model_id(&self) -> &str {
//!         "first-words"
//!     }
//! }
//!
//! let config = CompressorConfig { token_threshold: 5, ..CompressorConfig::default() };
//! let compressor = PromptCompressor::new(config, Words, FirstWords);
//!
//! let result = compressor.compress(
//!     "We have owned many cars over the years and liked most of them. I have three kids. Which SUV fits?",
//! );
//! assert_eq!(result.compressed, "We have owned I have three kids. Which SUV fits?");
//! ```

#![warn(missing_docs)]

mod cache;
mod compressor;
mod config;
mod error;
mod prompt;
mod tail;

pub use cache::{cache_key, InMemoryCache};
pub use compressor::{PromptCompressor, DEFAULT_TOKEN_MODEL};
pub use config::CompressorConfig;
pub use error::CompressorError;
pub use prompt::{PromptBuilder, DEFAULT_MAX_SEARCHES, DEFAULT_MAX_SOURCES};
pub use tail::{sentence_spans, split_tail, Segments};
