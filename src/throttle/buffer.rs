//! Throttled value: accepts writes at any rate, publishes at a bounded rate.

use std::time::{Duration, Instant};

/// A value holder that coalesces frequent writes into periodic publishes.
///
/// Writes land in a buffer immediately and never block. Only
/// [`poll`](Self::poll) (on the flush cadence), [`flush`](Self::flush) and
/// [`finish`](Self::finish) move the buffer into the published value.
#[derive(Debug, Clone)]
pub struct ThrottledValue<T> {
    /// Last published value.
    current: T,
    /// Latest write not yet published. `Some` means dirty.
    pending: Option<T>,
    /// Flush cadence.
    interval: Duration,
    /// When the next periodic flush is due.
    next_flush: Instant,
}

impl<T> ThrottledValue<T> {
    /// Create a throttled value publishing at most once per `interval`,
    /// with the first flush due one interval after `now`.
    pub fn new(initial: T, interval: Duration, now: Instant) -> Self {
        Self {
            current: initial,
            pending: None,
            interval,
            next_flush: now + interval,
        }
    }

    /// The published value.
    pub const fn current(&self) -> &T {
        &self.current
    }

    /// The latest written value, published or not.
    pub fn buffered(&self) -> &T {
        self.pending.as_ref().unwrap_or(&self.current)
    }

    /// Whether a write is waiting to be published.
    pub const fn is_stale(&self) -> bool {
        self.pending.is_some()
    }

    /// Flush cadence.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// When the next periodic flush is due.
    pub const fn next_flush(&self) -> Instant {
        self.next_flush
    }

    /// Buffer a new value.
    pub fn write(&mut self, value: T) {
        self.pending = Some(value);
    }

    /// Buffer a value derived from the latest buffered one.
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(self.buffered());
        self.pending = Some(next);
    }

    /// Mutate the buffered value in place, marking it dirty.
    pub fn modify(&mut self, f: impl FnOnce(&mut T))
    where
        T: Clone,
    {
        let pending = self.pending.get_or_insert_with(|| self.current.clone());
        f(pending);
    }

    /// Run the periodic flush if it is due. Returns `true` if a value was
    /// published.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_flush {
            return false;
        }

        self.next_flush += self.interval;
        // Behind schedule: resume from now rather than flushing in a burst.
        if self.next_flush <= now {
            self.next_flush = now + self.interval;
        }

        self.flush()
    }

    /// Publish the buffer immediately if dirty.
    pub fn flush(&mut self) -> bool {
        match self.pending.take() {
            Some(value) => {
                self.current = value;
                true
            }
            None => false,
        }
    }

    /// Tear down: final flush, then return the published value.
    pub fn finish(mut self) -> T {
        self.flush();
        self.current
    }
}
