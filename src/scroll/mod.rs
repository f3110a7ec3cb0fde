//! Scroll coordination: follow new content unless the user is reading back.
//!
//! ```text
//!  scroll events ──▶ ScrollArbiter ◀── request_scroll_to_bottom (per update)
//!                        │
//!                        └── run_frame ──▶ Viewport::scroll_to
//! ```

mod arbiter;
mod transcript;
mod viewport;

pub use arbiter::{
    FollowMode, ScrollArbiter, ScrollConfig, ScrollState, CATCH_UP_DELAY, JITTER_THRESHOLD,
    MANUAL_LOCK, NEAR_BOTTOM_THRESHOLD, REARM_DELAY,
};
pub use transcript::{Line, Transcript, TranscriptConfig};
pub use viewport::{ScrollBehavior, Viewport};
