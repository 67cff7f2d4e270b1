//! Splitting a question into compressible background and protected tail
//!
//! The tail is the last sentence ending in `?` plus the sentence before it,
//! through the end of the text. It is never summarized so the actual ask
//! reaches the model verbatim.

use std::ops::Range;

/// A question split into background and tail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segments<'a> {
    /// Background that may be summarized (may be empty)
    pub head: &'a str,
    /// Protected question context, `None` when the text asks nothing
    pub tail: Option<&'a str>,
}

/// Byte ranges of the sentences in `text`
///
/// A sentence ends at `.`, `?` or `!` followed by whitespace; the whitespace
/// run belongs to neither sentence.
pub fn sentence_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '?' | '!') {
            continue;
        }
        let Some(&(_, next)) = chars.peek() else {
            break;
        };
        if !next.is_whitespace() {
            continue;
        }

        spans.push(start..i + c.len_utf8());
        start = text.len();
        while let Some(&(j, w)) = chars.peek() {
            if !w.is_whitespace() {
                start = j;
                break;
            }
            chars.next();
        }
    }

    if start < text.len() {
        spans.push(start..text.len());
    }
    spans
}

/// Split `text` into head and tail
///
/// Leading and trailing whitespace is ignored. Without a sentence ending in
/// `?` the whole text is the head.
///
/// # Examples
///
/// ```
/// use brandlens_compressor::split_tail;
///
/// let segments = split_tail("Some history. More history. I drive a lot. Which car fits me?");
/// assert_eq!(segments.head, "Some history. More history.");
/// assert_eq!(segments.tail, Some("I drive a lot. Which car fits me?"));
/// ```
pub fn split_tail(text: &str) -> Segments<'_> {
    let text = text.trim();
    let spans = sentence_spans(text);

    let Some(question) = spans.iter().rposition(|s| text[s.clone()].ends_with('?')) else {
        return Segments { head: text, tail: None };
    };

    let tail_start = spans[question.saturating_sub(1)].start;
    Segments {
        head: text[..tail_start].trim_end(),
        tail: Some(&text[tail_start..]),
    }
}
