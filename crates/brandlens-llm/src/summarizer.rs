//! Summarizers used by the prompt compressor
//!
//! - `LlmSummarizer`: asks any `LlmProvider` for a word-bounded summary
//! - `LeadSentenceSummarizer`: keeps leading sentences, no model needed
//! - `MockSummarizer`: scripted behaviour for tests

use crate::LlmError;
use brandlens_domain::{LlmProvider, Summarizer};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default lower bound on summary length, in words
pub const DEFAULT_MIN_WORDS: usize = 20;

/// Word budget for summarizing `text` at `ratio`
///
/// Never below `min_words`, so short inputs are left roughly as they are.
pub fn target_words(text: &str, ratio: f64, min_words: usize) -> usize {
    let words = text.split_whitespace().count();
    min_words.max((words as f64 * ratio) as usize)
}

/// Summarizes through an LLM provider
pub struct LlmSummarizer<P> {
    provider: P,
    min_words: usize,
}

impl<P: LlmProvider> LlmSummarizer<P> {
    /// Wrap a provider
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            min_words: DEFAULT_MIN_WORDS,
        }
    }

    /// Set the lower bound on summary length
    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words;
        self
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn prompt(&self, text: &str, ratio: f64) -> String {
        format!(
            "Summarize the following background in at most {} words. \
             Keep names, numbers and concrete facts. \
             Reply with the summary only.\n\n---\n{}\n---",
            target_words(text, ratio, self.min_words),
            text.trim()
        )
    }
}

impl<P: LlmProvider> Summarizer for LlmSummarizer<P> {
    type Error = P::Error;

    fn summarize(&self, text: &str, ratio: f64) -> Result<String, Self::Error> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        let summary = self.provider.generate(&self.prompt(text, ratio))?;
        Ok(summary.trim().to_string())
    }

    fn model_id(&self) -> &str {
        self.provider.model_name()
    }
}

/// Extractive summarizer keeping whole leading sentences
///
/// Deterministic and offline: takes sentences from the start while they fit
/// the word budget, or cuts the first sentence when even it does not fit.
#[derive(Debug, Clone)]
pub struct LeadSentenceSummarizer {
    min_words: usize,
}

impl Default for LeadSentenceSummarizer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_WORDS)
    }
}

impl LeadSentenceSummarizer {
    /// Create a summarizer with a lower bound on summary length
    pub fn new(min_words: usize) -> Self {
        Self { min_words }
    }
}

impl Summarizer for LeadSentenceSummarizer {
    type Error = Infallible;

    fn summarize(&self, text: &str, ratio: f64) -> Result<String, Self::Error> {
        let budget = target_words(text, ratio, self.min_words).max(1);

        let mut sentences: Vec<Vec<&str>> = vec![Vec::new()];
        for word in text.split_whitespace() {
            if let Some(current) = sentences.last_mut() {
                current.push(word);
            }
            if word.ends_with(['.', '?', '!']) {
                sentences.push(Vec::new());
            }
        }

        let mut kept: Vec<&str> = Vec::new();
        for sentence in sentences.iter().filter(|s| !s.is_empty()) {
            if kept.len() + sentence.len() > budget {
                break;
            }
            kept.extend(sentence);
        }

        if kept.is_empty() {
            kept = text.split_whitespace().take(budget).collect();
        }
        Ok(kept.join(" "))
    }

    fn model_id(&self) -> &str {
        "lead-sentence"
    }
}

#[derive(Debug, Clone)]
enum MockBehaviour {
    Fixed(String),
    Truncate,
    Fail(String),
}

/// Scripted summarizer for tests
///
/// Clones share the call counter.
///
/// # Examples
///
/// ```
/// use brandlens_llm::MockSummarizer;
/// use brandlens_domain::Summarizer;
///
/// let summarizer = MockSummarizer::truncating();
/// assert_eq!(summarizer.summarize("one two three four", 0.5).unwrap(), "one two");
/// assert_eq!(summarizer.call_count(), 1);
///
/// let broken = MockSummarizer::failing("offline");
/// assert!(broken.summarize("text", 0.5).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MockSummarizer {
    behaviour: MockBehaviour,
    delay: Option<Duration>,
    call_count: Arc<Mutex<usize>>,
}

impl MockSummarizer {
    /// Always return `summary`
    pub fn fixed(summary: impl Into<String>) -> Self {
        Self::with_behaviour(MockBehaviour::Fixed(summary.into()))
    }

    /// Keep the leading `ratio` share of words (at least one)
    pub fn truncating() -> Self {
        Self::with_behaviour(MockBehaviour::Truncate)
    }

    /// Always fail with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behaviour(MockBehaviour::Fail(message.into()))
    }

    fn with_behaviour(behaviour: MockBehaviour) -> Self {
        Self {
            behaviour,
            delay: None,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Sleep for `delay` on every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times summarize was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Summarizer for MockSummarizer {
    type Error = LlmError;

    fn summarize(&self, text: &str, ratio: f64) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        match &self.behaviour {
            MockBehaviour::Fixed(summary) => Ok(summary.clone()),
            MockBehaviour::Truncate => {
                let words: Vec<&str> = text.split_whitespace().collect();
                let keep = ((words.len() as f64 * ratio).ceil() as usize).clamp(1, words.len().max(1));
                Ok(words.into_iter().take(keep).collect::<Vec<_>>().join(" "))
            }
            MockBehaviour::Fail(message) => Err(LlmError::Other(message.clone())),
        }
    }

    fn model_id(&self) -> &str {
        "mock-summarizer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;

    #[test]
    fn test_target_words() {
        assert_eq!(target_words("a b c", 0.4, 20), 20);
        let long = "word ".repeat(300);
        assert_eq!(target_words(&long, 0.4, 20), 120);
    }

    #[test]
    fn test_llm_summarizer_uses_provider() {
        let provider = MockProvider::new("  A short summary.  ");
        let summarizer = LlmSummarizer::new(provider.clone());

        let summary = summarizer.summarize("Long background text.", 0.4).unwrap();
        assert_eq!(summary, "A short summary.");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(summarizer.model_id(), "mock-model");
    }

    #[test]
    fn test_llm_summarizer_prompt_states_budget() {
        let summarizer = LlmSummarizer::new(MockProvider::default()).with_min_words(5);
        let prompt = summarizer.prompt(&"word ".repeat(100), 0.4);
        assert!(prompt.contains("at most 40 words"));
    }

    #[test]
    fn test_llm_summarizer_skips_blank_input() {
        let provider = MockProvider::default();
        let summarizer = LlmSummarizer::new(provider.clone());
        assert_eq!(summarizer.summarize("   ", 0.4).unwrap(), "");
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_llm_summarizer_propagates_errors() {
        let summarizer = LlmSummarizer::new(MockProvider::failing());
        assert!(summarizer.summarize("Some text.", 0.4).is_err());
    }

    #[test]
    fn test_lead_sentences_fit_budget() {
        let summarizer = LeadSentenceSummarizer::new(1);
        let text = "One two three. Four five six. Seven eight nine. Ten eleven twelve.";
        assert_eq!(summarizer.summarize(text, 0.5).unwrap(), "One two three. Four five six.");
    }

    #[test]
    fn test_lead_sentence_cut_when_too_long() {
        let summarizer = LeadSentenceSummarizer::new(1);
        let text = "one two three four five six seven eight nine ten";
        assert_eq!(summarizer.summarize(text, 0.3).unwrap(), "one two three");
    }

    #[test]
    fn test_mock_summarizer_shares_count() {
        let summarizer = MockSummarizer::fixed("short");
        let clone = summarizer.clone();
        clone.summarize("x", 0.4).unwrap();
        assert_eq!(summarizer.call_count(), 1);
    }
}
