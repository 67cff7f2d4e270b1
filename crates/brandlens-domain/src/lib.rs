//! Brandlens Domain Layer
//!
//! Value types and collaborator traits shared by every Brandlens crate.
//!
//! ## Key Concepts
//!
//! - **Citation**: a URL found in an LLM answer, with the pattern that produced it
//! - **Mention**: an occurrence of the brand name, linked or unlinked
//! - **SourceSet**: citation URLs partitioned into owned and external
//! - **CompressionResult**: what happened when a prompt was (or was not) compressed
//!
//! ## Architecture
//!
//! This crate holds no behaviour beyond small invariant helpers. The extraction
//! engine, the prompt compressor and the LLM adapters live in other crates and
//! meet here through the traits in [`traits`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod citation;
pub mod compression;
pub mod mention;
pub mod source;
pub mod traits;

// Re-exports for convenience
pub use citation::{Citation, PatternType};
pub use compression::{CacheKey, CompressionOutcome, CompressionResult};
pub use mention::{Mention, MentionKind};
pub use source::{DomainError, Ownership, SourceSet};
pub use traits::{CompressionCache, LlmProvider, Summarizer, TokenCounter};
