//! # Reveal
//!
//! Paced message reveal and scroll-follow arbitration for chat transcripts.
//!
//! Finished AI messages are replayed a couple of sentences at a time so a
//! transcript reads as if it were being written live, while the viewport
//! keeps up with new text unless the user has scrolled back to read.
//!
//! ## Core Concepts
//!
//! - **Chunker**: splits a message into sentence-grouped chunks
//! - **Reveal coordinator**: claims each message once and reveals it on a
//!   fixed cadence, cascading messages that arrive together
//! - **Scroll arbiter**: infers manual vs. programmatic scrolling and gates
//!   "scroll to bottom" requests accordingly
//! - **Throttled values**: coalesce high-frequency updates before render
//!
//! Everything runs on one host loop. Nothing reads the clock: the host
//! passes `Instant`s in (usually from a [`TickerActor`]), which keeps all
//! timing deterministic.
//!
//! ## Example
//!
//! ```rust,ignore
//! use reveal::{RevealCoordinator, ScrollArbiter, ScrollBehavior, Transcript};
//!
//! let mut coordinator = RevealCoordinator::new();
//! let mut arbiter = ScrollArbiter::new();
//! arbiter.attach(Transcript::new(80, 24));
//!
//! coordinator.consider_batch(&messages, now);
//! if let Some(view) = arbiter.viewport_mut() {
//!     coordinator.advance(now, view);
//! }
//! arbiter.request_scroll_to_bottom(false, ScrollBehavior::Smooth, now);
//! arbiter.run_frame();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod error;
pub mod message;
pub mod reveal;
pub mod scroll;
pub mod text;
pub mod throttle;
pub mod timer;

// Re-exports for convenience
pub use actor::{MarkRevealedWorker, RevealStore, Tick, TickerActor, TickerConfig};
pub use error::{Error, Result, StoreError};
pub use message::{Message, MessageId, MessageKind, SessionId};
pub use reveal::{
    ChannelNotifier, NoopNotifier, RevealConfig, RevealCoordinator, RevealNotifier, RevealSink,
    RevealUpdate, StreamingState, ThrottledSink,
};
pub use scroll::{
    FollowMode, ScrollArbiter, ScrollBehavior, ScrollConfig, Transcript, TranscriptConfig,
    Viewport,
};
pub use text::Chunker;
pub use throttle::ThrottledValue;
pub use timer::TimerQueue;
