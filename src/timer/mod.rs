//! Scheduled callbacks for a single-threaded host loop.
//!
//! Components never read the clock. The host passes `Instant`s in, and
//! each component drains its own [`TimerQueue`] before handling the call,
//! so a timer that came due before an event is always observed first.

mod queue;

pub use queue::{TimerId, TimerQueue};
