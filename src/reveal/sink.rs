//! Reveal output: the per-step update and the sinks that receive it.

use crate::message::MessageId;
use crate::throttle::ThrottledValue;
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

/// Cumulative text for one message after a reveal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealUpdate {
    /// Message being revealed.
    pub message_id: MessageId,
    /// Everything visible so far.
    pub text: String,
    /// Whether this is the final update for the message.
    pub complete: bool,
}

/// Receives reveal updates. Called at most once per scheduled step.
pub trait RevealSink {
    /// Handle one update.
    fn on_reveal(&mut self, update: RevealUpdate);
}

impl<F: FnMut(RevealUpdate)> RevealSink for F {
    fn on_reveal(&mut self, update: RevealUpdate) {
        self(update);
    }
}

/// Collects updates in order.
impl RevealSink for Vec<RevealUpdate> {
    fn on_reveal(&mut self, update: RevealUpdate) {
        self.push(update);
    }
}

/// Rate-limits coordinator output before it reaches the view.
///
/// Keeps the latest update per message. On each flush the messages that
/// changed since the previous flush are forwarded downstream, once each.
/// A completion replaces any partial still buffered for the same message,
/// so completions are never coalesced away.
///
/// Tear down with [`finish`](Self::finish). Dropping the sink discards
/// whatever is still buffered, completions included.
#[derive(Debug)]
#[must_use = "buffered updates are lost unless the sink is polled and finished"]
pub struct ThrottledSink {
    snapshot: ThrottledValue<BTreeMap<MessageId, RevealUpdate>>,
    /// Messages written since the last flush.
    touched: BTreeSet<MessageId>,
}

impl ThrottledSink {
    /// Create a sink flushing at most once per `interval`.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            snapshot: ThrottledValue::new(BTreeMap::new(), interval, now),
            touched: BTreeSet::new(),
        }
    }

    /// Latest published update per message.
    pub const fn published(&self) -> &BTreeMap<MessageId, RevealUpdate> {
        self.snapshot.current()
    }

    /// Whether buffered updates have not reached the view yet.
    pub const fn is_stale(&self) -> bool {
        self.snapshot.is_stale()
    }

    /// Run the periodic flush, forwarding changes to `downstream`.
    /// Returns the number of updates forwarded.
    pub fn poll(&mut self, now: Instant, downstream: &mut impl RevealSink) -> usize {
        if self.snapshot.poll(now) {
            self.forward(downstream)
        } else {
            0
        }
    }

    /// Flush immediately.
    pub fn flush(&mut self, downstream: &mut impl RevealSink) -> usize {
        if self.snapshot.flush() {
            self.forward(downstream)
        } else {
            0
        }
    }

    /// Teardown: forward anything still buffered. This is the only
    /// teardown path that delivers pending completions.
    pub fn finish(mut self, downstream: &mut impl RevealSink) -> usize {
        self.flush(downstream)
    }

    /// Drop all buffered and published state, e.g. on session change.
    pub fn clear(&mut self) {
        self.snapshot.flush();
        self.snapshot.write(BTreeMap::new());
        self.snapshot.flush();
        self.touched.clear();
    }

    fn forward(&mut self, downstream: &mut impl RevealSink) -> usize {
        let published = self.snapshot.current();
        let mut forwarded = 0;
        for id in std::mem::take(&mut self.touched) {
            if let Some(update) = published.get(&id) {
                downstream.on_reveal(update.clone());
                forwarded += 1;
            }
        }
        forwarded
    }
}

impl RevealSink for ThrottledSink {
    fn on_reveal(&mut self, update: RevealUpdate) {
        self.touched.insert(update.message_id.clone());
        self.snapshot.modify(|map| {
            map.insert(update.message_id.clone(), update);
        });
    }
}
