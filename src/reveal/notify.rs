//! Completion notifications to the persistence layer.
//!
//! When a message finishes (naturally or via skip) the coordinator tells a
//! [`RevealNotifier`] so the "revealed" flag can be persisted. Delivery is
//! fire-and-forget: a notifier must not block and must not fail loudly.

use crate::error::{Error, Result};
use crate::message::MessageId;
use crossbeam_channel::{Sender, TrySendError};

/// Receives "message fully revealed" notifications.
pub trait RevealNotifier {
    /// Called exactly once per completed reveal.
    fn notify_revealed(&mut self, id: &MessageId);
}

/// Discards notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl RevealNotifier for NoopNotifier {
    fn notify_revealed(&mut self, _id: &MessageId) {}
}

/// Records notifications in order.
impl RevealNotifier for Vec<MessageId> {
    fn notify_revealed(&mut self, id: &MessageId) {
        self.push(id.clone());
    }
}

/// Forwards notifications over a channel without blocking.
///
/// Paired with [`MarkRevealedWorker`](crate::actor::MarkRevealedWorker),
/// which performs the actual store write off the UI thread. If the channel
/// is full or closed the notification is logged and dropped.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: Sender<MessageId>,
}

impl ChannelNotifier {
    /// Wrap a sender.
    pub const fn new(tx: Sender<MessageId>) -> Self {
        Self { tx }
    }

    /// Queue `id` without blocking.
    ///
    /// A full queue drops the notification (logged) and still returns
    /// `Ok`; only a stopped worker is an error.
    pub fn try_notify(&self, id: &MessageId) -> Result<()> {
        match self.tx.try_send(id.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(id)) => {
                tracing::warn!(message_id = %id, "mark-revealed queue full, dropping");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(Error::NotifierClosed),
        }
    }
}

impl RevealNotifier for ChannelNotifier {
    fn notify_revealed(&mut self, id: &MessageId) {
        if let Err(err) = self.try_notify(id) {
            tracing::warn!(message_id = %id, error = %err, "dropping mark-revealed notification");
        }
    }
}
