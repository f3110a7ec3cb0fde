//! Keyed timer queue.
//!
//! Deadlines are ordered by `(deadline, sequence)`, so timers sharing a
//! deadline fire in the order they were scheduled. Each key owns at most
//! one pending timer; scheduling an existing key replaces it.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::time::Instant;

/// Handle returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Single-threaded timer queue keyed by `K`.
#[derive(Debug)]
pub struct TimerQueue<K> {
    /// Pending timers in firing order.
    by_deadline: BTreeMap<(Instant, TimerId), K>,
    /// Reverse index for cancellation by key.
    by_key: HashMap<K, (Instant, TimerId)>,
    /// Next sequence number.
    next_id: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            by_deadline: BTreeMap::new(),
            by_key: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<K: Clone + Eq + Hash> TimerQueue<K> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `key` to fire at `deadline`, replacing any pending timer
    /// for the same key.
    pub fn schedule(&mut self, key: K, deadline: Instant) -> TimerId {
        self.cancel(&key);

        let id = TimerId(self.next_id);
        self.next_id += 1;

        self.by_deadline.insert((deadline, id), key.clone());
        self.by_key.insert(key, (deadline, id));
        id
    }

    /// Cancel the timer for `key`. Returns `true` if one was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.by_key.remove(key) {
            Some(slot) => {
                self.by_deadline.remove(&slot);
                true
            }
            None => false,
        }
    }

    /// Cancel every timer whose key matches `pred`. Returns how many were
    /// cancelled.
    pub fn cancel_matching(&mut self, mut pred: impl FnMut(&K) -> bool) -> usize {
        let doomed: Vec<K> = self.by_key.keys().filter(|k| pred(k)).cloned().collect();
        for key in &doomed {
            self.cancel(key);
        }
        doomed.len()
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.by_deadline.clear();
        self.by_key.clear();
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(K, Instant)> {
        let (&(deadline, _), _) = self.by_deadline.first_key_value()?;
        if deadline > now {
            return None;
        }
        let ((deadline, _), key) = self.by_deadline.pop_first()?;
        self.by_key.remove(&key);
        Some((key, deadline))
    }

    /// Deadline of the next pending timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.by_deadline.first_key_value().map(|(&(deadline, _), _)| deadline)
    }

    /// Whether a timer is pending for `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.by_key.contains_key(key)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule("late", t0 + ms(300));
        queue.schedule("early", t0 + ms(100));

        assert_eq!(queue.pop_due(t0 + ms(50)), None);
        assert_eq!(queue.pop_due(t0 + ms(500)).map(|(k, _)| k), Some("early"));
        assert_eq!(queue.pop_due(t0 + ms(500)).map(|(k, _)| k), Some("late"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ties_fire_in_schedule_order() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule(2, t0);
        queue.schedule(1, t0);
        queue.schedule(3, t0);

        let order: Vec<_> = std::iter::from_fn(|| queue.pop_due(t0).map(|(k, _)| k)).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn test_reschedule_replaces() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule("a", t0 + ms(10));
        queue.schedule("a", t0 + ms(1000));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_due(t0 + ms(500)), None);
        assert_eq!(queue.next_deadline(), Some(t0 + ms(1000)));
    }

    #[test]
    fn test_cancel_matching_leaves_others() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule(("m1", 0), t0);
        queue.schedule(("m1", 1), t0 + ms(10));
        queue.schedule(("m2", 0), t0 + ms(5));

        assert_eq!(queue.cancel_matching(|(id, _)| *id == "m1"), 2);
        assert!(!queue.contains(&("m1", 0)));
        assert!(queue.contains(&("m2", 0)));
        assert_eq!(queue.pop_due(t0 + ms(100)).map(|(k, _)| k), Some(("m2", 0)));
    }

    #[test]
    fn test_cancel_and_clear() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule(1, t0);
        assert!(queue.cancel(&1));
        assert!(!queue.cancel(&1));

        queue.schedule(2, t0);
        queue.clear();
        assert_eq!(queue.pop_due(t0 + ms(1)), None);
        assert_eq!(queue.next_deadline(), None);
    }
}
