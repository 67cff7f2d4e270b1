//! Prompt compression with tail preservation
//!
//! # Strategy
//!
//! 1. Split the question into background (head) and tail
//! 2. Leave everything alone while the segment is under the token threshold
//! 3. Otherwise summarize the segment, consulting the cache first
//! 4. Reattach the tail verbatim
//!
//! Any summarizer failure falls back to the original text. Failures are
//! never cached, so a later call retries.

use crate::cache::{cache_key, InMemoryCache};
use crate::config::CompressorConfig;
use crate::tail::split_tail;
use brandlens_domain::{CacheKey, CompressionCache, CompressionResult, Summarizer, TokenCounter};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Model whose encoding is used when counting tokens, unless overridden
pub const DEFAULT_TOKEN_MODEL: &str = "gpt-4";

/// Compresses long question backgrounds while keeping the ask intact
///
/// Concurrent calls for the same segment are serialized: the first caller
/// summarizes, the others wait and then read its cached result.
pub struct PromptCompressor<C, S> {
    config: CompressorConfig,
    counter: C,
    summarizer: S,
    cache: Arc<dyn CompressionCache>,
    token_model: String,
    in_flight: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl<C, S> PromptCompressor<C, S>
where
    C: TokenCounter,
    S: Summarizer,
    S::Error: fmt::Display,
{
    /// Create a compressor with an in-memory cache sized from `config`
    pub fn new(config: CompressorConfig, counter: C, summarizer: S) -> Self {
        let mut cache = InMemoryCache::new();
        if let Some(ttl) = config.cache_ttl() {
            cache = cache.with_ttl(ttl);
        }
        if let Some(max) = config.cache_max_entries {
            cache = cache.with_max_entries(max);
        }

        Self {
            config,
            counter,
            summarizer,
            cache: Arc::new(cache),
            token_model: DEFAULT_TOKEN_MODEL.to_string(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Use a shared cache instead of the private one
    pub fn with_cache(mut self, cache: Arc<dyn CompressionCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Count tokens with the encoding of `model`
    pub fn with_token_model(mut self, model: impl Into<String>) -> Self {
        self.token_model = model.into();
        self
    }

    /// Active configuration
    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// The cache consulted before summarizing
    pub fn cache(&self) -> &Arc<dyn CompressionCache> {
        &self.cache
    }

    /// Token count of `text` under the configured model
    pub fn count_tokens(&self, text: &str) -> usize {
        self.counter.count_tokens(text, &self.token_model)
    }

    /// Compress a question
    ///
    /// Never fails. `compressed` equals the input unless the background was
    /// over threshold and the summarizer produced a usable summary.
    pub fn compress(&self, question: &str) -> CompressionResult {
        let ratio = self.config.ratio;
        let segments = split_tail(question);

        let segment_tokens = self.count_tokens(segments.head);
        if segment_tokens <= self.config.token_threshold {
            debug!(
                "Segment has {} tokens (threshold {}), passing through",
                segment_tokens, self.config.token_threshold
            );
            return CompressionResult::passthrough(question, ratio);
        }

        let summary = match self.compress_segment(segments.head, segment_tokens) {
            Ok(summary) => summary,
            Err(reason) => {
                warn!("Compression failed, using original text: {}", reason);
                return CompressionResult::fallback(question, ratio, reason);
            }
        };

        let final_text = match segments.tail {
            Some(tail) => format!("{} {}", summary.trim(), tail),
            None => summary.trim().to_string(),
        };
        let achieved = token_ratio(self.count_tokens(&final_text), self.count_tokens(question));

        info!(
            "Compressed question from {} to {} tokens (ratio {:.2}, requested {:.2})",
            self.count_tokens(question),
            self.count_tokens(&final_text),
            achieved,
            ratio
        );

        CompressionResult::compressed(question, final_text, ratio, achieved)
    }

    fn compress_segment(&self, segment: &str, segment_tokens: usize) -> Result<String, String> {
        let key = cache_key(segment, self.config.ratio, self.summarizer.model_id());

        if let Some(hit) = self.cached(&key, segment) {
            return Ok(hit);
        }

        let slot = self.claim(&key);
        let result = {
            let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            match self.cached(&key, segment) {
                Some(hit) => Ok(hit),
                None => self.summarize(segment, segment_tokens).map(|(summary, tokens)| {
                    let achieved = token_ratio(tokens, segment_tokens);
                    self.cache.put(
                        key.clone(),
                        CompressionResult::compressed(segment, summary.clone(), self.config.ratio, achieved),
                    );
                    summary
                }),
            }
        };
        self.release(&key, slot);

        result
    }

    /// Cached summary for `segment`, ignoring entries stored for other text
    fn cached(&self, key: &CacheKey, segment: &str) -> Option<String> {
        let hit = self.cache.get(key)?;
        if hit.original != segment {
            warn!("Ignoring cache entry {} recorded for different text", key);
            return None;
        }
        if hit.used_fallback {
            debug!("Ignoring cache entry {} holding a failed compression", key);
            return None;
        }
        debug!("Compression cache hit for {}", key);
        Some(hit.compressed)
    }

    /// Run the summarizer and check its output
    fn summarize(&self, segment: &str, segment_tokens: usize) -> Result<(String, usize), String> {
        let summary = self
            .summarizer
            .summarize(segment, self.config.ratio)
            .map_err(|e| format!("summarizer '{}' failed: {}", self.summarizer.model_id(), e))?;

        if summary.trim().is_empty() {
            return Err("summarizer returned empty output".to_string());
        }

        let tokens = self.count_tokens(&summary);
        if tokens > segment_tokens {
            return Err(format!(
                "summary is longer than its input ({} > {} tokens)",
                tokens, segment_tokens
            ));
        }

        Ok((summary, tokens))
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<Mutex<()>>>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn claim(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        self.in_flight().entry(key.clone()).or_default().clone()
    }

    fn release(&self, key: &CacheKey, slot: Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight();
        // One reference in the map, one held here: nobody else is waiting.
        if Arc::strong_count(&slot) <= 2 {
            in_flight.remove(key);
        }
    }
}

fn token_ratio(tokens: usize, original_tokens: usize) -> f64 {
    if original_tokens == 0 {
        1.0
    } else {
        tokens as f64 / original_tokens as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct WordCounter;

    impl TokenCounter for WordCounter {
        fn count_tokens(&self, text: &str, _model: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    /// Keeps the leading share of words
    #[derive(Default)]
    struct Truncating {
        calls: AtomicUsize,
    }

    impl Summarizer for Truncating {
        type Error = String;

        fn summarize(&self, text: &str, ratio: f64) -> Result<String, Self::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let words: Vec<&str> = text.split_whitespace().collect();
            let keep = ((words.len() as f64 * ratio).ceil() as usize).max(1);
            Ok(words[..keep].join(" "))
        }

        fn model_id(&self) -> &str {
            "truncating"
        }
    }

    struct Fixed(&'static str);

    impl Summarizer for Fixed {
        type Error = String;

        fn summarize(&self, _text: &str, _ratio: f64) -> Result<String, Self::Error> {
            Ok(self.0.to_string())
        }

        fn model_id(&self) -> &str {
            "fixed"
        }
    }

    struct Broken;

    impl Summarizer for Broken {
        type Error = String;

        fn summarize(&self, _text: &str, _ratio: f64) -> Result<String, Self::Error> {
            Err("model offline".to_string())
        }

        fn model_id(&self) -> &str {
            "broken"
        }
    }

    fn config(threshold: usize) -> CompressorConfig {
        CompressorConfig {
            token_threshold: threshold,
            ratio: 0.5,
            ..CompressorConfig::default()
        }
    }

    const QUESTION: &str =
        "one two three four five six seven eight. I want a car. Which model should I buy?";

    #[test]
    fn test_short_question_passes_through() {
        let compressor = PromptCompressor::new(config(120), WordCounter, Truncating::default());
        let result = compressor.compress(QUESTION);

        assert_eq!(result.compressed, QUESTION);
        assert!(!result.used_fallback);
        assert!(!result.was_compressed());
        assert_eq!(compressor.summarizer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_only_head_is_compressed() {
        let compressor = PromptCompressor::new(config(4), WordCounter, Truncating::default());
        let result = compressor.compress(QUESTION);

        assert!(result.was_compressed());
        assert_eq!(
            result.compressed,
            "one two three four I want a car. Which model should I buy?"
        );
        assert!(result.ratio_achieved < 1.0);
        assert_eq!(result.ratio_requested, 0.5);
    }

    #[test]
    fn test_question_without_tail_compressed_whole() {
        let compressor = PromptCompressor::new(config(4), WordCounter, Truncating::default());
        let result = compressor.compress("Describe the brand history in detail please.");

        assert_eq!(result.compressed, "Describe the brand history");
    }

    #[test]
    fn test_failing_summarizer_falls_back() {
        let compressor = PromptCompressor::new(config(4), WordCounter, Broken);
        let result = compressor.compress(QUESTION);

        assert!(result.used_fallback);
        assert_eq!(result.compressed, QUESTION);
        assert!(compressor.cache().is_empty());
    }

    #[test]
    fn test_empty_and_longer_output_fall_back() {
        let empty = PromptCompressor::new(config(4), WordCounter, Fixed("   "));
        assert!(empty.compress(QUESTION).used_fallback);

        let longer = PromptCompressor::new(
            config(4),
            WordCounter,
            Fixed("a b c d e f g h i j k l m n o p q r s t"),
        );
        let result = longer.compress(QUESTION);
        assert!(result.used_fallback);
        assert_eq!(result.compressed, QUESTION);
        assert!(longer.cache().is_empty());
    }

    #[test]
    fn test_cache_short_circuits_summarizer() {
        let compressor = PromptCompressor::new(config(4), WordCounter, Truncating::default());

        let first = compressor.compress(QUESTION);
        let second = compressor.compress(QUESTION);

        assert_eq!(first, second);
        assert_eq!(compressor.summarizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(compressor.cache().len(), 1);
    }

    #[test]
    fn test_cache_entry_for_other_text_ignored() {
        let cache: Arc<dyn CompressionCache> = Arc::new(InMemoryCache::new());
        let head = "one two three four five six seven eight.";
        cache.put(
            cache_key(head, 0.5, "truncating"),
            CompressionResult::compressed("something else entirely", "bogus", 0.5, 0.1),
        );

        let compressor = PromptCompressor::new(config(4), WordCounter, Truncating::default())
            .with_cache(cache);
        let result = compressor.compress(QUESTION);

        assert!(!result.compressed.contains("bogus"));
        assert_eq!(compressor.summarizer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cached_fallback_entry_ignored() {
        let cache: Arc<dyn CompressionCache> = Arc::new(InMemoryCache::new());
        let head = "one two three four five six seven eight.";
        cache.put(
            cache_key(head, 0.5, "truncating"),
            CompressionResult::fallback(head, 0.5, "model offline"),
        );

        let compressor = PromptCompressor::new(config(4), WordCounter, Truncating::default())
            .with_cache(cache);
        let result = compressor.compress(QUESTION);

        assert!(result.was_compressed());
        assert!(result.compressed.starts_with("one two three four I want"));
        assert_eq!(compressor.summarizer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_in_flight_slots_released() {
        let compressor = PromptCompressor::new(config(4), WordCounter, Truncating::default());
        compressor.compress(QUESTION);
        assert!(compressor.in_flight().is_empty());
    }
}
