//! Paced reveal of finished messages.
//!
//! Messages arrive complete from the persistence layer. The coordinator
//! replays them a chunk at a time so the transcript reads as if it were
//! being written live:
//!
//! ```text
//! Message ──▶ Chunker ──▶ StreamingState ──(timer)──▶ RevealSink ──▶ view
//!                                 │
//!                                 └── on completion ──▶ RevealNotifier
//! ```

mod coordinator;
mod notify;
mod sink;
mod state;

pub use coordinator::{RevealConfig, RevealCoordinator, DEFAULT_STAGGER, DEFAULT_STEP_INTERVAL};
pub use notify::{ChannelNotifier, NoopNotifier, RevealNotifier};
pub use sink::{RevealSink, RevealUpdate, ThrottledSink};
pub use state::StreamingState;
