//! Transcript: a row-based viewport over an ordered list of messages.
//!
//! Each message is laid out into width-wrapped lines (grapheme aware, wide
//! characters counted by display width) with a blank separator between
//! messages. The line store is bounded; the oldest rows are discarded once
//! `max_scrollback` is exceeded.
//!
//! The scroll offset is the index of the top visible row, so it behaves
//! like a browser `scrollTop`: appending content below does not move it.

use super::viewport::{ScrollBehavior, Viewport};
use crate::message::{Message, MessageId};
use crate::reveal::{RevealSink, RevealUpdate};
use std::collections::VecDeque;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Configuration for the transcript.
#[derive(Debug, Clone)]
pub struct TranscriptConfig {
    /// Maximum lines to keep in scrollback.
    pub max_scrollback: usize,
    /// Whether to wrap long lines (otherwise they are clipped).
    pub word_wrap: bool,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            max_scrollback: 10_000,
            word_wrap: true,
        }
    }
}

/// A laid-out row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Row text.
    pub text: String,
    /// Whether this row continues the previous one (soft wrap).
    pub wrapped: bool,
}

impl Line {
    const fn empty() -> Self {
        Self {
            text: String::new(),
            wrapped: false,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    id: MessageId,
    sequence: i64,
    text: String,
}

/// Row-based transcript viewport.
#[derive(Debug)]
pub struct Transcript {
    config: TranscriptConfig,
    width: u16,
    height: u16,
    /// Messages in presentation order.
    entries: Vec<Entry>,
    /// Laid-out rows.
    lines: VecDeque<Line>,
    /// Index of the top visible row.
    top: usize,
    /// Rows dropped from the front by the scrollback bound.
    trimmed: usize,
}

impl Transcript {
    /// Create an empty transcript with the given size.
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_config(width, height, TranscriptConfig::default())
    }

    /// Create an empty transcript with custom configuration.
    pub fn with_config(width: u16, height: u16, config: TranscriptConfig) -> Self {
        Self {
            config,
            width,
            height,
            entries: Vec::new(),
            lines: VecDeque::new(),
            top: 0,
            trimmed: 0,
        }
    }

    /// Add a message, showing `text` for it (empty for a message that is
    /// about to be revealed). Existing messages are updated in place.
    pub fn push_message(&mut self, message: &Message, text: &str) {
        self.upsert(&message.id, Some(message.sequence), text);
    }

    /// Set the text shown for `id`. Unknown messages are appended.
    pub fn set_text(&mut self, id: &MessageId, text: &str) {
        self.upsert(id, None, text);
    }

    fn upsert(&mut self, id: &MessageId, sequence: Option<i64>, text: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| &e.id == id) {
            if entry.text == text {
                return;
            }
            entry.text = text.to_string();
        } else {
            let sequence = sequence.unwrap_or_else(|| {
                self.entries.last().map_or(0, |e| e.sequence.saturating_add(1))
            });
            let at = self.entries.partition_point(|e| e.sequence <= sequence);
            self.entries.insert(
                at,
                Entry {
                    id: id.clone(),
                    sequence,
                    text: text.to_string(),
                },
            );
        }
        self.relayout();
    }

    /// Text shown for `id`.
    pub fn text(&self, id: &MessageId) -> Option<&str> {
        self.entries.iter().find(|e| &e.id == id).map(|e| e.text.as_str())
    }

    /// Number of messages.
    pub fn message_count(&self) -> usize {
        self.entries.len()
    }

    /// Remove everything (e.g. on session change).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lines.clear();
        self.top = 0;
        self.trimmed = 0;
    }

    /// Resize and re-wrap.
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.relayout();
        }
    }

    /// Total rows.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the top visible row.
    pub const fn top(&self) -> usize {
        self.top
    }

    /// Rows currently visible.
    pub fn visible_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.range(self.top..).take(usize::from(self.height))
    }

    /// Scroll up by the given number of rows (user input).
    pub const fn scroll_up(&mut self, rows: usize) {
        self.top = self.top.saturating_sub(rows);
    }

    /// Scroll down by the given number of rows (user input).
    pub fn scroll_down(&mut self, rows: usize) {
        self.top = (self.top + rows).min(self.max_top());
    }

    /// Whether the last row is visible.
    pub fn at_bottom(&self) -> bool {
        self.top >= self.max_top()
    }

    fn max_top(&self) -> usize {
        self.lines.len().saturating_sub(usize::from(self.height))
    }

    /// Rebuild all rows from the message list.
    fn relayout(&mut self) {
        // Keep the top row anchored in absolute terms across trimming.
        let absolute_top = self.top + self.trimmed;

        self.lines.clear();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                self.lines.push_back(Line::empty());
            }
            let width = usize::from(self.width);
            self.lines.extend(layout(&entry.text, width, self.config.word_wrap));
        }

        self.trimmed = self.lines.len().saturating_sub(self.config.max_scrollback);
        self.lines.drain(..self.trimmed);

        self.top = absolute_top.saturating_sub(self.trimmed).min(self.max_top());
    }
}

/// Lay out one message into rows of at most `width` display columns.
fn layout(text: &str, width: usize, word_wrap: bool) -> Vec<Line> {
    let mut lines = Vec::new();
    for hard_line in text.split('\n') {
        let mut current = Line::empty();
        let mut col = 0;

        for grapheme in hard_line.graphemes(true) {
            let g_width = UnicodeWidthStr::width(grapheme);
            if width > 0 && col + g_width > width {
                if !word_wrap {
                    break;
                }
                lines.push(std::mem::replace(
                    &mut current,
                    Line {
                        text: String::new(),
                        wrapped: true,
                    },
                ));
                col = 0;
            }
            current.text.push_str(grapheme);
            col += g_width;
        }
        lines.push(current);
    }
    lines
}

impl Viewport for Transcript {
    #[allow(clippy::cast_precision_loss)]
    fn scroll_offset(&self) -> f64 {
        self.top as f64
    }

    #[allow(clippy::cast_precision_loss)]
    fn scroll_height(&self) -> f64 {
        self.lines.len() as f64
    }

    fn client_height(&self) -> f64 {
        f64::from(self.height)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn scroll_to(&mut self, offset: f64, _behavior: ScrollBehavior) {
        let row = offset.round().max(0.0) as usize;
        self.top = row.min(self.max_top());
    }
}

/// Reveal updates write straight into the transcript.
impl RevealSink for Transcript {
    fn on_reveal(&mut self, update: RevealUpdate) {
        self.set_text(&update.message_id, &update.text);
    }
}
