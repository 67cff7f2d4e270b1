//! Token counting
//!
//! [`TiktokenCounter`] counts with the model's BPE encoding from
//! `tiktoken-rs`; models without one are counted with `cl100k_base`.
//! [`HeuristicTokenCounter`] estimates from character classes using a
//! per-encoding characters-per-token ratio and needs no vocabulary. It is
//! also what `TiktokenCounter` falls back to if an encoding cannot be loaded.

use brandlens_domain::TokenCounter;
use std::sync::LazyLock;
use tiktoken_rs::tokenizer::{get_tokenizer, Tokenizer};
use tiktoken_rs::{get_bpe_from_tokenizer, CoreBPE};
use tracing::{debug, warn};

/// A tokenizer family and its estimation ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Encoding {
    /// Encoding name
    pub name: &'static str,
    /// Average ASCII characters per token
    pub chars_per_token: f32,
}

/// Encoding used when the model is unknown
pub const FALLBACK_ENCODING: Encoding = Encoding {
    name: "cl100k_base",
    chars_per_token: 4.0,
};

const O200K: Encoding = Encoding {
    name: "o200k_base",
    chars_per_token: 4.2,
};

const LLAMA: Encoding = Encoding {
    name: "llama",
    chars_per_token: 3.8,
};

const CLAUDE: Encoding = Encoding {
    name: "claude",
    chars_per_token: 3.5,
};

/// Model name fragments mapped to encodings, most specific first
const MODEL_ENCODINGS: &[(&str, Encoding)] = &[
    ("gpt-4o", O200K),
    ("gpt-4", FALLBACK_ENCODING),
    ("gpt-3.5", FALLBACK_ENCODING),
    ("text-embedding-3", FALLBACK_ENCODING),
    ("claude", CLAUDE),
    ("llama", LLAMA),
    ("mistral", LLAMA),
    ("mixtral", LLAMA),
    ("hermes", LLAMA),
];

/// Encoding for `model`, if it is known
///
/// Matching ignores case and any `vendor/` prefix.
pub fn encoding_for_model(model: &str) -> Option<Encoding> {
    let model = model.to_lowercase();
    let name = model.rsplit('/').next().unwrap_or(model.as_str());
    MODEL_ENCODINGS
        .iter()
        .find(|(fragment, _)| name.contains(fragment))
        .map(|(_, encoding)| *encoding)
}

/// Character-class token estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenCounter;

impl HeuristicTokenCounter {
    /// Create a new counter
    pub fn new() -> Self {
        Self
    }

    /// Estimate tokens of `text` under `encoding`
    pub fn estimate(text: &str, encoding: Encoding) -> usize {
        if text.is_empty() {
            return 0;
        }

        let mut ascii = 0u32;
        let mut other = 0u32;
        for c in text.chars() {
            if c.is_ascii() {
                ascii += 1;
            } else {
                other += 1;
            }
        }

        // Non-ASCII characters split into roughly two per token
        (ascii as f32 / encoding.chars_per_token + other as f32 / 2.0).ceil() as usize
    }
}

impl TokenCounter for HeuristicTokenCounter {
    fn count_tokens(&self, text: &str, model: &str) -> usize {
        let encoding = encoding_for_model(model).unwrap_or_else(|| {
            debug!("No encoding known for '{}', using {}", model, FALLBACK_ENCODING.name);
            FALLBACK_ENCODING
        });
        Self::estimate(text, encoding)
    }
}

static CL100K: LazyLock<Option<CoreBPE>> = LazyLock::new(|| load(Tokenizer::Cl100kBase));
static O200K_BPE: LazyLock<Option<CoreBPE>> = LazyLock::new(|| load(Tokenizer::O200kBase));
static P50K: LazyLock<Option<CoreBPE>> = LazyLock::new(|| load(Tokenizer::P50kBase));
static P50K_EDIT: LazyLock<Option<CoreBPE>> = LazyLock::new(|| load(Tokenizer::P50kEdit));
static R50K: LazyLock<Option<CoreBPE>> = LazyLock::new(|| load(Tokenizer::R50kBase));

fn load(tokenizer: Tokenizer) -> Option<CoreBPE> {
    match get_bpe_from_tokenizer(tokenizer) {
        Ok(bpe) => Some(bpe),
        Err(e) => {
            warn!("Failed to load {:?} encoding: {}", tokenizer, e);
            None
        }
    }
}

/// Tokenizer family used for `model`
///
/// The `vendor/` prefix of router model names is ignored. Models unknown to
/// tiktoken use `cl100k_base`.
pub fn tokenizer_for_model(model: &str) -> Tokenizer {
    let name = model.rsplit('/').next().unwrap_or(model);
    get_tokenizer(name).unwrap_or_else(|| {
        debug!("No tokenizer known for '{}', using cl100k_base", model);
        Tokenizer::Cl100kBase
    })
}

fn encoder(tokenizer: Tokenizer) -> Option<&'static CoreBPE> {
    let bpe: &'static LazyLock<Option<CoreBPE>> = match tokenizer {
        Tokenizer::O200kBase => &O200K_BPE,
        Tokenizer::P50kBase => &P50K,
        Tokenizer::P50kEdit => &P50K_EDIT,
        Tokenizer::R50kBase | Tokenizer::Gpt2 => &R50K,
        _ => &CL100K,
    };
    LazyLock::force(bpe).as_ref()
}

/// BPE token counter backed by `tiktoken-rs`
///
/// Encodings are loaded once per process on first use.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiktokenCounter;

impl TiktokenCounter {
    /// Create a new counter
    pub fn new() -> Self {
        Self
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_tokens(&self, text: &str, model: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        match encoder(tokenizer_for_model(model)) {
            Some(bpe) => bpe.encode_ordinary(text).len(),
            None => HeuristicTokenCounter.count_tokens(text, model),
        }
    }
}
