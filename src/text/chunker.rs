//! Chunker: splits a finished message into sentence-grouped reveal units.
//!
//! A sentence ends at `.`, `!` or `?` immediately followed by whitespace.
//! Sentences are grouped in runs of [`Chunker::sentences_per_chunk`] and
//! re-joined with single spaces.

use serde::Deserialize;
use std::borrow::Cow;

/// Default number of sentences per chunk.
pub const DEFAULT_SENTENCES_PER_CHUNK: usize = 2;

/// Payload shape some producers wrap message text in.
#[derive(Deserialize)]
struct Envelope {
    content: String,
}

/// Sentence-grouping splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    sentences_per_chunk: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_SENTENCES_PER_CHUNK)
    }
}

impl Chunker {
    /// Create a chunker grouping `sentences_per_chunk` sentences (at least 1).
    pub fn new(sentences_per_chunk: usize) -> Self {
        Self {
            sentences_per_chunk: sentences_per_chunk.max(1),
        }
    }

    /// Sentences grouped into one chunk.
    pub const fn sentences_per_chunk(&self) -> usize {
        self.sentences_per_chunk
    }

    /// Return the text inside a `{"content": "..."}` envelope, or the input
    /// unchanged if it is not one.
    ///
    /// Malformed JSON is not an error; it is simply treated as text.
    pub fn unwrap_envelope(content: &str) -> Cow<'_, str> {
        let trimmed = content.trim();
        if !trimmed.starts_with('{') {
            return Cow::Borrowed(content);
        }
        match serde_json::from_str::<Envelope>(trimmed) {
            Ok(envelope) => Cow::Owned(envelope.content),
            Err(_) => Cow::Borrowed(content),
        }
    }

    /// Split `content` into ordered chunks.
    ///
    /// Never returns an empty vector: text without sentence units comes
    /// back whole as a single chunk.
    pub fn split(&self, content: &str) -> Vec<String> {
        self.split_text(&Self::unwrap_envelope(content))
    }

    /// Split text that has already been unwrapped. Envelopes inside it are
    /// left alone.
    pub(crate) fn split_text(&self, text: &str) -> Vec<String> {
        let units = sentences(text);

        if units.is_empty() {
            return vec![text.to_string()];
        }

        units
            .chunks(self.sentences_per_chunk)
            .map(|group| group.join(" "))
            .collect()
    }
}

/// Split with the default grouping of two sentences per chunk.
pub fn split(content: &str) -> Vec<String> {
    Chunker::default().split(content)
}

/// Break text at whitespace runs that follow terminal punctuation.
///
/// Units keep their punctuation and are trimmed; empty units are dropped.
fn sentences(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            units.push(&text[start..idx]);

            // Swallow the rest of the whitespace run.
            let mut end = idx + ch.len_utf8();
            while let Some(&(next_idx, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = next_idx + next.len_utf8();
                chars.next();
            }
            start = end;
            prev = None;
            continue;
        }
        prev = Some(ch);
    }
    units.push(&text[start..]);

    units
        .into_iter()
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
        .collect()
}
