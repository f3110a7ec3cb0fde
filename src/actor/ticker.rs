//! Ticker Actor: Dedicated thread for generating frame ticks.
//!
//! The reveal core never reads the clock; it is driven by the timestamps of
//! these ticks. Feed each [`Tick::at`] to the coordinator, the arbiter and
//! any throttled values from the host loop.

use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the ticker.
#[derive(Debug, Clone)]
pub struct TickerConfig {
    /// Time between ticks (16ms is roughly 60 FPS).
    pub interval: Duration,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(16),
        }
    }
}

/// A tick event sent at regular intervals.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Frame number (monotonically increasing).
    pub frame: u64,
    /// When the tick was generated.
    pub at: Instant,
    /// Time elapsed since the ticker was started.
    pub elapsed: Duration,
}

/// Ticker actor that generates regular timing events.
pub struct TickerActor {
    /// Handle to the ticker thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Receiver for tick events.
    tick_rx: Receiver<Tick>,
}

impl TickerActor {
    /// Spawn a new ticker actor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the OS fails to spawn the ticker thread.
    pub fn spawn(config: &TickerConfig) -> Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let interval = config.interval;

        // Two slots: a slow host reads recent ticks, never a backlog.
        let (tick_tx, tick_rx) = bounded(2);

        let handle = thread::Builder::new()
            .name("reveal-ticker".to_string())
            .spawn(move || {
                Self::run_loop(&tick_tx, &shutdown_clone, interval);
            })
            .map_err(|source| Error::Spawn {
                name: "reveal-ticker",
                source,
            })?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
            tick_rx,
        })
    }

    /// Get a reference to the tick receiver.
    ///
    /// Use this with `select!` for event-driven loops:
    ///
    /// ```ignore
    /// loop {
    ///     select! {
    ///         recv(scroll_events) -> _ => arbiter.on_scroll(Instant::now()),
    ///         recv(ticker.receiver()) -> tick => {
    ///             let at = tick?.at;
    ///             coordinator.advance(at, &mut transcript);
    ///             arbiter.run_frame();
    ///         }
    ///     }
    /// }
    /// ```
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Tick> {
        &self.tick_rx
    }

    /// Ask the thread to stop; takes effect within a millisecond.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Stop ticking and wait for the thread to exit.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Emit ticks until shutdown or until the host drops the receiver.
    fn run_loop(tick_tx: &Sender<Tick>, shutdown: &AtomicBool, interval: Duration) {
        let start = Instant::now();
        let mut frame = 0u64;
        let mut deadline = start + interval;

        while !shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now < deadline {
                thread::sleep((deadline - now).min(Duration::from_millis(1)));
                continue;
            }

            let tick = Tick {
                frame,
                at: now,
                elapsed: now - start,
            };
            match tick_tx.try_send(tick) {
                // A busy host misses frames; reveal timers only read `at`.
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => break,
            }

            frame += 1;
            deadline += interval;
            // After a stall, resync rather than firing a backlog.
            if deadline < now {
                deadline = now + interval;
            }
        }
    }
}

impl Drop for TickerActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
