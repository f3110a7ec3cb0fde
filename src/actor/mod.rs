//! Actors: background threads around the single-threaded reveal core.
//!
//! The coordinator, arbiter and throttles all live on the host's UI loop.
//! Two helpers run beside it and talk to it over crossbeam channels:
//!
//! - **Ticker**: emits frame ticks whose timestamps drive every timer
//! - **Marker**: persists "revealed" flags without blocking the loop
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐        Tick         ┌──────────────┐
//! │Ticker Thread │ ─────────────────▶  │              │
//! └──────────────┘                     │  Host Loop   │
//!                                      │ (coordinator,│
//! ┌──────────────┐      MessageId      │  arbiter)    │
//! │Marker Thread │ ◀────────────────── │              │
//! └──────────────┘                     └──────────────┘
//!        │
//!        ▼
//!  RevealStore
//! ```

mod marker;
mod ticker;

pub use marker::{MarkRevealedWorker, MarkStats, MarkerConfig, RevealStore};
pub use ticker::{Tick, TickerActor, TickerConfig};
