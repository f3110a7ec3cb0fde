//! Per-message reveal progress.

use crate::message::MessageId;

/// Progress of one message through its chunks.
///
/// Owned by the coordinator and mutated only by its own reveal steps,
/// `skip`, and `reset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingState {
    message_id: MessageId,
    /// Full target text, published verbatim on completion.
    content: String,
    chunks: Vec<String>,
    /// Index of the next chunk to reveal.
    next_index: usize,
    /// Currently published cumulative text.
    visible: String,
    revealing: bool,
}

impl StreamingState {
    pub(crate) fn new(message_id: MessageId, content: String, chunks: Vec<String>) -> Self {
        Self {
            message_id,
            content,
            chunks,
            next_index: 0,
            visible: String::new(),
            revealing: true,
        }
    }

    /// The message being revealed.
    pub const fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    /// Full target text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Chunks in reveal order.
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Index of the next chunk to reveal.
    pub const fn next_index(&self) -> usize {
        self.next_index
    }

    /// Text published so far.
    pub fn visible(&self) -> &str {
        &self.visible
    }

    /// Whether the reveal is still in progress.
    pub const fn is_revealing(&self) -> bool {
        self.revealing
    }

    /// Whether the step at `next_index` is the last one.
    pub(crate) fn on_last_chunk(&self) -> bool {
        self.next_index + 1 >= self.chunks.len()
    }

    /// Publish chunks `0..=next_index` and move to the next chunk.
    pub(crate) fn advance(&mut self) -> &str {
        self.visible = self.chunks[..=self.next_index].join(" ");
        self.next_index += 1;
        &self.visible
    }

    /// Publish the full content and go terminal.
    pub(crate) fn finish(&mut self) -> &str {
        self.revealing = false;
        self.next_index = self.chunks.len();
        self.visible.clone_from(&self.content);
        &self.visible
    }
}
