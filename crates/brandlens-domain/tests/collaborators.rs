//! Collaborator traits implemented from outside the crate

use brandlens_domain::{
    CacheKey, CompressionCache, CompressionResult, LlmProvider, Summarizer, TokenCounter,
};
use std::collections::HashMap;
use std::sync::Mutex;

struct Echo;

impl LlmProvider for Echo {
    type Error = String;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        Ok(prompt.to_string())
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

struct FirstWord;

impl Summarizer for FirstWord {
    type Error = String;

    fn summarize(&self, text: &str, _ratio: f64) -> Result<String, Self::Error> {
        text.split_whitespace()
            .next()
            .map(str::to_string)
            .ok_or_else(|| "empty input".to_string())
    }

    fn model_id(&self) -> &str {
        "first-word"
    }
}

struct Words;

impl TokenCounter for Words {
    fn count_tokens(&self, text: &str, _model: &str) -> usize {
        text.split_whitespace().count()
    }
}

#[derive(Default)]
struct MapCache(Mutex<HashMap<CacheKey, CompressionResult>>);

impl CompressionCache for MapCache {
    fn get(&self, key: &CacheKey) -> Option<CompressionResult> {
        self.0.lock().unwrap().get(key).cloned()
    }

    fn put(&self, key: CacheKey, value: CompressionResult) {
        self.0.lock().unwrap().entry(key).or_insert(value);
    }

    fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

#[test]
fn test_traits_usable_from_crate_root() {
    assert_eq!(Echo.generate("hi").unwrap(), "hi");
    assert_eq!(Echo.model_name(), "echo");
    assert_eq!(FirstWord.summarize("Tesla builds cars", 0.4).unwrap(), "Tesla");
    assert!(FirstWord.summarize("   ", 0.4).is_err());
    assert_eq!(Words.count_tokens("Tesla builds cars", "any"), 3);

    let cache = MapCache::default();
    assert!(cache.is_empty());
    let key = CacheKey::from_digest("abc");
    cache.put(key.clone(), CompressionResult::passthrough("first", 0.4));
    cache.put(key.clone(), CompressionResult::passthrough("second", 0.4));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&key).unwrap().original, "first");
}
