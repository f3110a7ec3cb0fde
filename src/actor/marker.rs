//! Mark-Revealed Worker: persists "revealed" flags off the UI thread.
//!
//! The coordinator hands finished message ids to a
//! [`ChannelNotifier`]; this actor drains the channel and writes each one
//! to a [`RevealStore`]. Writes are best-effort: failures are logged and
//! never retried, since the reveal itself has already finished on screen.

use crate::error::{Error, Result, StoreError};
use crate::message::MessageId;
use crate::reveal::ChannelNotifier;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Persistence collaborator that records revealed messages.
pub trait RevealStore: Send + 'static {
    /// Persist the "already revealed" flag for `id`.
    fn mark_revealed(&mut self, id: &MessageId) -> Result<(), StoreError>;
}

impl<F> RevealStore for F
where
    F: FnMut(&MessageId) -> Result<(), StoreError> + Send + 'static,
{
    fn mark_revealed(&mut self, id: &MessageId) -> Result<(), StoreError> {
        self(id)
    }
}

/// Configuration for the worker.
#[derive(Debug, Clone)]
pub struct MarkerConfig {
    /// Queue capacity; notifications beyond it are dropped.
    pub capacity: usize,
    /// How long to wait for work before checking shutdown.
    pub poll_timeout: Duration,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            poll_timeout: Duration::from_millis(50),
        }
    }
}

/// Worker counters.
#[derive(Debug, Default)]
struct Counters {
    marked: AtomicU64,
    failed: AtomicU64,
}

/// Snapshot of worker statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkStats {
    /// Successful writes.
    pub marked: u64,
    /// Failed writes (logged, not retried).
    pub failed: u64,
}

/// Background writer for revealed flags.
pub struct MarkRevealedWorker {
    /// Handle to the worker thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    counters: Arc<Counters>,
}

impl MarkRevealedWorker {
    /// Spawn the worker, returning it with a notifier for the coordinator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the OS fails to spawn the worker thread.
    pub fn spawn(
        store: impl RevealStore,
        config: &MarkerConfig,
    ) -> Result<(Self, ChannelNotifier)> {
        let (tx, rx) = bounded::<MessageId>(config.capacity.max(1));
        let shutdown = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(Counters::default());

        let shutdown_clone = shutdown.clone();
        let counters_clone = counters.clone();
        let poll_timeout = config.poll_timeout;

        let handle = thread::Builder::new()
            .name("reveal-marker".to_string())
            .spawn(move || {
                Self::run_loop(store, &rx, &shutdown_clone, &counters_clone, poll_timeout);
            })
            .map_err(|source| Error::Spawn {
                name: "reveal-marker",
                source,
            })?;

        Ok((
            Self {
                handle: Some(handle),
                shutdown,
                counters,
            },
            ChannelNotifier::new(tx),
        ))
    }

    /// Current statistics.
    pub fn stats(&self) -> MarkStats {
        MarkStats {
            marked: self.counters.marked.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Signal the worker to stop after draining what is queued.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Stop the worker and wait for it to finish.
    pub fn join(mut self) -> MarkStats {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.stats()
    }

    fn run_loop(
        mut store: impl RevealStore,
        rx: &Receiver<MessageId>,
        shutdown: &AtomicBool,
        counters: &Counters,
        poll_timeout: Duration,
    ) {
        loop {
            match rx.recv_timeout(poll_timeout) {
                Ok(id) => Self::mark(&mut store, &id, counters),
                Err(RecvTimeoutError::Timeout) => {
                    if shutdown.load(Ordering::Relaxed) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // Whatever is still queued at shutdown is written before exiting.
        for id in rx.try_iter() {
            Self::mark(&mut store, &id, counters);
        }
    }

    fn mark(store: &mut impl RevealStore, id: &MessageId, counters: &Counters) {
        match store.mark_revealed(id) {
            Ok(()) => {
                debug!(message_id = %id, "marked revealed");
                counters.marked.fetch_add(1, Ordering::Relaxed);
            }
            Err(source) => {
                let err = Error::Store {
                    id: id.clone(),
                    source,
                };
                warn!(
                    error = &err as &(dyn std::error::Error + 'static),
                    "mark-revealed failed"
                );
                counters.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl Drop for MarkRevealedWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
