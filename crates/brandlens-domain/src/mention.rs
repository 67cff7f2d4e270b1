//! Mention module - brand-name occurrences inside an answer

use serde::{Deserialize, Serialize};

/// Whether a mention carries its own link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionKind {
    /// `Brand[url]`, `[Brand](url)` and name variants with a bracketed URL
    Linked,
    /// The bare brand name or its possessive
    Unlinked,
}

/// A brand mention
///
/// Offsets are bytes into the original, unmodified answer text. A linked
/// mention always has a `url`; an unlinked one never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Brand name that was searched for
    pub brand: String,

    /// Surface form that matched (`Tesla's`, `Brand_Name`, ...)
    pub text: String,

    /// Start offset of the mention span
    pub start: usize,

    /// End offset (exclusive)
    pub end: usize,

    /// Linked or unlinked
    #[serde(rename = "type")]
    pub kind: MentionKind,

    /// Attached URL for linked mentions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Mention {
    /// Create a linked mention
    pub fn linked(
        brand: impl Into<String>,
        text: impl Into<String>,
        start: usize,
        end: usize,
        url: impl Into<String>,
    ) -> Self {
        Self {
            brand: brand.into(),
            text: text.into(),
            start,
            end,
            kind: MentionKind::Linked,
            url: Some(url.into()),
        }
    }

    /// Create an unlinked mention
    pub fn unlinked(brand: impl Into<String>, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            brand: brand.into(),
            text: text.into(),
            start,
            end,
            kind: MentionKind::Unlinked,
            url: None,
        }
    }

    /// Whether this is a linked mention
    pub fn is_linked(&self) -> bool {
        self.kind == MentionKind::Linked
    }

    /// Whether the two mentions share any byte of `[start, end)`
    pub fn overlaps(&self, other: &Mention) -> bool {
        self.start < other.end && other.start < self.end
    }
}
