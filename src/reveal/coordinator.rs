//! Reveal Coordinator: paces finished messages out chunk by chunk.
//!
//! Each eligible message is claimed once per coordinator lifetime and
//! revealed on a fixed cadence. Messages arriving together are started in
//! sequence order with a small stagger so their reveals cascade.
//!
//! # Example
//!
//! ```rust,ignore
//! use reveal::{Message, MessageKind, RevealCoordinator, RevealUpdate};
//!
//! let mut coordinator = RevealCoordinator::new();
//! let mut shown: Vec<RevealUpdate> = Vec::new();
//!
//! coordinator.consider_batch(&messages, now);
//! // On every frame:
//! coordinator.advance(Instant::now(), &mut shown);
//! ```

use super::notify::{NoopNotifier, RevealNotifier};
use super::sink::{RevealSink, RevealUpdate};
use super::state::StreamingState;
use crate::message::{Message, MessageId, SessionId};
use crate::text::{Chunker, DEFAULT_SENTENCES_PER_CHUNK};
use crate::timer::TimerQueue;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Delay between reveal steps, roughly three sentences per second.
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(350);

/// Offset between the starts of messages revealed in the same batch.
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(100);

/// Configuration for the reveal coordinator.
#[derive(Debug, Clone)]
pub struct RevealConfig {
    /// Delay between consecutive chunks of one message.
    pub step_interval: Duration,
    /// Start offset between messages accepted in the same batch.
    pub stagger: Duration,
    /// Sentences grouped into one chunk.
    pub sentences_per_chunk: usize,
    /// Whether messages already flagged revealed upstream are shown
    /// instantly instead of being streamed again.
    pub skip_already_revealed: bool,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            step_interval: DEFAULT_STEP_INTERVAL,
            stagger: DEFAULT_STAGGER,
            sentences_per_chunk: DEFAULT_SENTENCES_PER_CHUNK,
            skip_already_revealed: true,
        }
    }
}

/// Timer key: one pending step per message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StepKey {
    message_id: MessageId,
    step: usize,
}

/// Owns every in-flight reveal for one conversation screen.
pub struct RevealCoordinator<N = NoopNotifier> {
    config: RevealConfig,
    chunker: Chunker,
    /// One state per claimed message, terminal ones included.
    states: HashMap<MessageId, StreamingState>,
    /// Identifiers that have ever started revealing since the last reset.
    claimed: HashSet<MessageId>,
    timers: TimerQueue<StepKey>,
    session: Option<SessionId>,
    notifier: N,
}

impl RevealCoordinator<NoopNotifier> {
    /// Create a coordinator with default configuration and no notifier.
    pub fn new() -> Self {
        Self::with_config(RevealConfig::default())
    }

    /// Create a coordinator with custom configuration and no notifier.
    pub fn with_config(config: RevealConfig) -> Self {
        Self::with_notifier(config, NoopNotifier)
    }
}

impl Default for RevealCoordinator<NoopNotifier> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: RevealNotifier> RevealCoordinator<N> {
    /// Create a coordinator reporting completions to `notifier`.
    pub fn with_notifier(config: RevealConfig, notifier: N) -> Self {
        Self {
            chunker: Chunker::new(config.sentences_per_chunk),
            config,
            states: HashMap::new(),
            claimed: HashSet::new(),
            timers: TimerQueue::new(),
            session: None,
            notifier,
        }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// The completion notifier.
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Whether `message` would be claimed by [`consider`](Self::consider).
    pub fn is_eligible(&self, message: &Message) -> bool {
        message.kind.is_revealable()
            && !(self.config.skip_already_revealed && message.revealed)
            && !self.claimed.contains(&message.id)
            && !self.states.contains_key(&message.id)
    }

    /// Claim `message` and schedule its first step at `now`.
    ///
    /// Returns `false` (and does nothing) if the message is not eligible:
    /// wrong kind, already revealed upstream, or already claimed.
    pub fn consider(&mut self, message: &Message, now: Instant) -> bool {
        self.claim(message, now)
    }

    /// Claim every eligible message in `messages`, in ascending sequence
    /// order, staggering their starts. Returns how many were claimed.
    pub fn consider_batch(&mut self, messages: &[Message], now: Instant) -> usize {
        let mut ordered: Vec<&Message> = messages.iter().collect();
        ordered.sort_by_key(|m| m.sequence);

        let mut start = now;
        let mut accepted = 0;
        for message in ordered {
            if self.claim(message, start) {
                accepted += 1;
                start += self.config.stagger;
            }
        }
        accepted
    }

    fn claim(&mut self, message: &Message, start: Instant) -> bool {
        if !self.is_eligible(message) {
            trace!(message_id = %message.id, "not eligible for reveal");
            return false;
        }

        let content = Chunker::unwrap_envelope(&message.content).into_owned();
        let chunks = self.chunker.split_text(&content);
        debug!(message_id = %message.id, chunks = chunks.len(), "claimed for reveal");

        self.claimed.insert(message.id.clone());
        self.states.insert(
            message.id.clone(),
            StreamingState::new(message.id.clone(), content, chunks),
        );
        self.timers.schedule(
            StepKey {
                message_id: message.id.clone(),
                step: 0,
            },
            start,
        );
        true
    }

    /// Run every reveal step due at or before `now`, in deadline order.
    /// Returns the number of steps run.
    pub fn advance(&mut self, now: Instant, sink: &mut impl RevealSink) -> usize {
        let mut fired = 0;
        while let Some((key, _deadline)) = self.timers.pop_due(now) {
            self.step(&key, now, sink);
            fired += 1;
        }
        fired
    }

    fn step(&mut self, key: &StepKey, now: Instant, sink: &mut impl RevealSink) {
        let Some(state) = self.states.get_mut(&key.message_id) else {
            return;
        };
        if !state.is_revealing() || state.next_index() != key.step {
            trace!(message_id = %key.message_id, step = key.step, "stale step ignored");
            return;
        }

        if state.on_last_chunk() {
            complete(state, &mut self.notifier, sink);
            return;
        }

        let text = state.advance().to_string();
        trace!(message_id = %key.message_id, step = key.step, "revealed chunk");
        sink.on_reveal(RevealUpdate {
            message_id: key.message_id.clone(),
            text,
            complete: false,
        });
        self.timers.schedule(
            StepKey {
                message_id: key.message_id.clone(),
                step: state.next_index(),
            },
            now + self.config.step_interval,
        );
    }

    /// Finish an in-progress reveal immediately.
    ///
    /// Pending steps are cancelled before anything else, so none can fire
    /// afterwards. Returns `false` if `id` is not currently revealing.
    pub fn skip(&mut self, id: &MessageId, sink: &mut impl RevealSink) -> bool {
        let Some(state) = self.states.get_mut(id) else {
            return false;
        };
        if !state.is_revealing() {
            return false;
        }

        self.timers.cancel_matching(|key| &key.message_id == id);
        debug!(message_id = %id, "reveal skipped");
        complete(state, &mut self.notifier, sink);
        true
    }

    /// Cancel every pending step and forget all claims and states.
    pub fn reset(&mut self) {
        self.timers.clear();
        self.claimed.clear();
        self.states.clear();
        info!("reveal coordinator reset");
    }

    /// Bind to a conversation. Resets when the session changes.
    ///
    /// Returns `true` if the binding changed.
    pub fn bind_session(&mut self, session: SessionId) -> bool {
        if self.session.as_ref() == Some(&session) {
            return false;
        }
        info!(session = %session, "switching reveal session");
        self.reset();
        self.session = Some(session);
        true
    }

    /// The bound session, if any.
    pub const fn session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    /// Reveal progress for `id`.
    pub fn state(&self, id: &MessageId) -> Option<&StreamingState> {
        self.states.get(id)
    }

    /// Text currently published for `id`.
    pub fn visible_text(&self, id: &MessageId) -> Option<&str> {
        self.states.get(id).map(StreamingState::visible)
    }

    /// Whether `id` is still being revealed.
    pub fn is_streaming(&self, id: &MessageId) -> bool {
        self.states.get(id).is_some_and(StreamingState::is_revealing)
    }

    /// Whether `id` has been claimed since the last reset.
    pub fn is_claimed(&self, id: &MessageId) -> bool {
        self.claimed.contains(id)
    }

    /// Number of messages still revealing.
    pub fn active_count(&self) -> usize {
        self.states.values().filter(|s| s.is_revealing()).count()
    }

    /// When the next step is due, for hosts that sleep between frames.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }
}

/// Publish the full content, go terminal, and notify upstream.
fn complete<N: RevealNotifier>(
    state: &mut StreamingState,
    notifier: &mut N,
    sink: &mut impl RevealSink,
) {
    let text = state.finish().to_string();
    let id = state.message_id().clone();
    debug!(message_id = %id, "reveal complete");
    sink.on_reveal(RevealUpdate {
        message_id: id.clone(),
        text,
        complete: true,
    });
    notifier.notify_revealed(&id);
}

impl<N> std::fmt::Debug for RevealCoordinator<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealCoordinator")
            .field("session", &self.session)
            .field("states", &self.states.len())
            .field("claimed", &self.claimed.len())
            .field("pending_steps", &self.timers.len())
            .finish_non_exhaustive()
    }
}
