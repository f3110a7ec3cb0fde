//! Message types shared by the coordinator and its collaborators.
//!
//! Messages are owned by the persistence layer; the reveal core only reads
//! them. They deserialize straight from query rows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Create a new message ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of the conversation a coordinator is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Create a new session ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    /// Written by the player.
    User,
    /// Produced by the model in character.
    AiGenerated,
    /// Scene narration.
    Narration,
    /// System notice.
    System,
}

impl MessageKind {
    /// Whether messages of this kind are revealed incrementally.
    pub const fn is_revealable(self) -> bool {
        matches!(self, Self::AiGenerated | Self::Narration)
    }
}

/// A finalized message as returned by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Record identifier.
    pub id: MessageId,
    /// Message category.
    pub kind: MessageKind,
    /// Full text (possibly a JSON envelope).
    pub content: String,
    /// Presentation order.
    pub sequence: i64,
    /// Persisted flag: already shown incrementally on an earlier visit.
    #[serde(default)]
    pub revealed: bool,
}

impl Message {
    /// Create an unrevealed message.
    pub fn new(
        id: impl Into<MessageId>,
        kind: MessageKind,
        content: impl Into<String>,
        sequence: i64,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            content: content.into(),
            sequence,
            revealed: false,
        }
    }

    /// Mark the message as already revealed.
    #[must_use]
    pub const fn with_revealed(mut self, revealed: bool) -> Self {
        self.revealed = revealed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revealable_kinds() {
        assert!(MessageKind::AiGenerated.is_revealable());
        assert!(MessageKind::Narration.is_revealable());
        assert!(!MessageKind::User.is_revealable());
        assert!(!MessageKind::System.is_revealable());
    }

    #[test]
    fn test_message_from_row() {
        let row = r#"{"id":"m1","kind":"ai-generated","content":"Hi.","sequence":3}"#;
        let msg: Message = serde_json::from_str(row).unwrap();
        assert_eq!(msg.id, MessageId::new("m1"));
        assert_eq!(msg.kind, MessageKind::AiGenerated);
        assert_eq!(msg.sequence, 3);
        assert!(!msg.revealed);
    }
}
