//! Scroll Arbiter: decides whether new content may pull the viewport down.
//!
//! Two modes. In [`FollowMode::AutoFollow`] requests to scroll to the
//! bottom are honoured. An upward scroll beyond the jitter threshold is
//! read as the user reading back, switching to
//! [`FollowMode::ManualOverride`] and arming a one-shot re-check. The user
//! can also catch back up by scrolling down to the bottom themselves.
//!
//! Programmatic scrolls go through a single pending-frame slot: a newer
//! request replaces an older one that has not run yet.

use super::viewport::{ScrollBehavior, Viewport};
use std::time::{Duration, Instant};
use tracing::trace;

/// Distance from the bottom that still counts as "at the bottom".
pub const NEAR_BOTTOM_THRESHOLD: f64 = 100.0;

/// Upward movement below this is treated as layout jitter.
pub const JITTER_THRESHOLD: f64 = 5.0;

/// How long after a manual scroll non-forced requests are refused.
pub const MANUAL_LOCK: Duration = Duration::from_millis(3000);

/// Delay of the one-shot check that may re-enable auto-follow.
pub const REARM_DELAY: Duration = Duration::from_millis(3000);

/// Minimum time after a manual scroll before scrolling down re-enables
/// auto-follow.
pub const CATCH_UP_DELAY: Duration = Duration::from_millis(1000);

/// Configuration for the scroll arbiter.
#[derive(Debug, Clone)]
pub struct ScrollConfig {
    /// See [`NEAR_BOTTOM_THRESHOLD`].
    pub near_bottom_threshold: f64,
    /// See [`JITTER_THRESHOLD`].
    pub jitter_threshold: f64,
    /// See [`MANUAL_LOCK`].
    pub manual_lock: Duration,
    /// See [`REARM_DELAY`].
    pub rearm_delay: Duration,
    /// See [`CATCH_UP_DELAY`].
    pub catch_up_delay: Duration,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            near_bottom_threshold: NEAR_BOTTOM_THRESHOLD,
            jitter_threshold: JITTER_THRESHOLD,
            manual_lock: MANUAL_LOCK,
            rearm_delay: REARM_DELAY,
            catch_up_delay: CATCH_UP_DELAY,
        }
    }
}

/// Auto-follow decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowMode {
    /// New content scrolls into view.
    AutoFollow,
    /// The user is reading back; leave the viewport alone.
    ManualOverride,
}

/// Per-viewport scroll tracking. Reset on every attach.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    /// Offset seen by the previous scroll event.
    pub last_offset: f64,
    /// Current mode.
    pub mode: FollowMode,
    /// When the last manual upward scroll was detected.
    pub last_manual_scroll: Option<Instant>,
}

impl ScrollState {
    /// Whether auto-follow is enabled.
    pub fn auto_follow(&self) -> bool {
        self.mode == FollowMode::AutoFollow
    }
}

/// Auto-follow arbiter for one viewport.
///
/// Every operation is a no-op while no viewport is attached.
#[derive(Debug)]
pub struct ScrollArbiter<V> {
    config: ScrollConfig,
    viewport: Option<V>,
    state: ScrollState,
    /// Deadline of the one-shot re-arm check.
    rearm_at: Option<Instant>,
    /// Programmatic scroll waiting for the next frame.
    pending_frame: Option<ScrollBehavior>,
}

impl<V: Viewport> Default for ScrollArbiter<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Viewport> ScrollArbiter<V> {
    /// Create a detached arbiter with default configuration.
    pub fn new() -> Self {
        Self::with_config(ScrollConfig::default())
    }

    /// Create a detached arbiter with custom configuration.
    pub const fn with_config(config: ScrollConfig) -> Self {
        Self {
            config,
            viewport: None,
            state: ScrollState {
                last_offset: 0.0,
                mode: FollowMode::AutoFollow,
                last_manual_scroll: None,
            },
            rearm_at: None,
            pending_frame: None,
        }
    }

    /// Attach a viewport and start from a fresh state.
    ///
    /// The initial mode is auto-follow only if the viewport starts near
    /// its bottom.
    pub fn attach(&mut self, viewport: V) {
        let mode = if self.near_bottom(&viewport) {
            FollowMode::AutoFollow
        } else {
            FollowMode::ManualOverride
        };
        self.state = ScrollState {
            last_offset: viewport.scroll_offset(),
            mode,
            last_manual_scroll: None,
        };
        self.rearm_at = None;
        self.pending_frame = None;
        self.viewport = Some(viewport);
        trace!(?mode, "viewport attached");
    }

    /// Detach and return the viewport, dropping any pending work.
    pub fn detach(&mut self) -> Option<V> {
        self.rearm_at = None;
        self.pending_frame = None;
        self.viewport.take()
    }

    /// Whether a viewport is attached.
    pub const fn is_attached(&self) -> bool {
        self.viewport.is_some()
    }

    /// The attached viewport.
    pub const fn viewport(&self) -> Option<&V> {
        self.viewport.as_ref()
    }

    /// The attached viewport, mutably (for content and geometry updates).
    pub fn viewport_mut(&mut self) -> Option<&mut V> {
        self.viewport.as_mut()
    }

    /// Current scroll tracking state.
    pub const fn state(&self) -> &ScrollState {
        &self.state
    }

    /// Current mode.
    pub const fn mode(&self) -> FollowMode {
        self.state.mode
    }

    /// Whether a programmatic scroll is waiting for [`run_frame`](Self::run_frame).
    pub const fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Deadline of the re-arm check, if armed.
    pub const fn rearm_deadline(&self) -> Option<Instant> {
        self.rearm_at
    }

    /// Whether the attached viewport is within the threshold of its bottom.
    pub fn is_near_bottom(&self) -> bool {
        self.viewport.as_ref().is_some_and(|v| self.near_bottom(v))
    }

    fn near_bottom(&self, viewport: &V) -> bool {
        viewport.distance_from_bottom() <= self.config.near_bottom_threshold
    }

    fn within(since: Option<Instant>, now: Instant, window: Duration) -> bool {
        since.is_some_and(|t| now.saturating_duration_since(t) < window)
    }

    /// Run the re-arm check if it is due.
    pub fn advance(&mut self, now: Instant) {
        let Some(deadline) = self.rearm_at else {
            return;
        };
        if now < deadline {
            return;
        }
        self.rearm_at = None;

        if self.is_near_bottom() {
            self.state.mode = FollowMode::AutoFollow;
            trace!("re-arm check: back at bottom, auto-follow");
        } else {
            trace!("re-arm check: still reading back");
        }
    }

    /// Handle a scroll event from the viewport.
    pub fn on_scroll(&mut self, now: Instant) {
        self.advance(now);
        let Some(viewport) = self.viewport.as_ref() else {
            return;
        };

        let offset = viewport.scroll_offset();
        let delta = offset - self.state.last_offset;
        let near_bottom = self.near_bottom(viewport);

        if delta < -self.config.jitter_threshold {
            if self.state.mode == FollowMode::AutoFollow {
                trace!(delta, "manual scroll up, pausing auto-follow");
            }
            self.state.mode = FollowMode::ManualOverride;
            self.state.last_manual_scroll = Some(now);
            self.rearm_at = Some(now + self.config.rearm_delay);
        } else if delta > 0.0
            && self.state.mode == FollowMode::ManualOverride
            && near_bottom
            && !Self::within(self.state.last_manual_scroll, now, self.config.catch_up_delay)
        {
            trace!("caught up with bottom, resuming auto-follow");
            self.state.mode = FollowMode::AutoFollow;
            self.rearm_at = None;
        }

        self.state.last_offset = offset;
    }

    /// Ask for the viewport to be scrolled to the bottom on the next frame.
    ///
    /// A forced request always goes through and leaves the mode alone.
    /// Otherwise the request is refused during the manual-scroll lock or
    /// while in manual override. Returns whether the request was queued.
    pub fn request_scroll_to_bottom(
        &mut self,
        force: bool,
        behavior: ScrollBehavior,
        now: Instant,
    ) -> bool {
        self.advance(now);
        if self.viewport.is_none() {
            return false;
        }

        if !force {
            if Self::within(self.state.last_manual_scroll, now, self.config.manual_lock) {
                trace!("scroll refused: manual lock");
                return false;
            }
            if self.state.mode == FollowMode::ManualOverride {
                trace!("scroll refused: manual override");
                return false;
            }
        }

        self.pending_frame = Some(behavior);
        true
    }

    /// Execute the pending scroll, if any. Returns whether one ran.
    pub fn run_frame(&mut self) -> bool {
        let Some(behavior) = self.pending_frame.take() else {
            return false;
        };
        let Some(viewport) = self.viewport.as_mut() else {
            return false;
        };
        let target = viewport.max_scroll_offset();
        viewport.scroll_to(target, behavior);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pixel viewport with directly settable geometry.
    #[derive(Debug, Clone, Copy)]
    struct Pane {
        offset: f64,
        height: f64,
        client: f64,
        last_behavior: Option<ScrollBehavior>,
    }

    impl Pane {
        fn at_bottom(height: f64, client: f64) -> Self {
            Self {
                offset: height - client,
                height,
                client,
                last_behavior: None,
            }
        }
    }

    impl Viewport for Pane {
        fn scroll_offset(&self) -> f64 {
            self.offset
        }
        fn scroll_height(&self) -> f64 {
            self.height
        }
        fn client_height(&self) -> f64 {
            self.client
        }
        fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior) {
            self.offset = offset;
            self.last_behavior = Some(behavior);
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn scroll_user(arbiter: &mut ScrollArbiter<Pane>, offset: f64, now: Instant) {
        arbiter.viewport_mut().unwrap().offset = offset;
        arbiter.on_scroll(now);
    }

    #[test]
    fn test_initial_mode_depends_on_position() {
        let mut arbiter = ScrollArbiter::new();
        arbiter.attach(Pane::at_bottom(1000.0, 400.0));
        assert_eq!(arbiter.mode(), FollowMode::AutoFollow);

        let mut pane = Pane::at_bottom(1000.0, 400.0);
        pane.offset = 100.0;
        arbiter.attach(pane);
        assert_eq!(arbiter.mode(), FollowMode::ManualOverride);
    }

    #[test]
    fn test_jitter_is_ignored() {
        let t0 = Instant::now();
        let mut arbiter = ScrollArbiter::new();
        arbiter.attach(Pane::at_bottom(1000.0, 400.0));
        scroll_user(&mut arbiter, 596.0, t0);
        assert_eq!(arbiter.mode(), FollowMode::AutoFollow);
        assert_eq!(arbiter.state().last_manual_scroll, None);
    }

    #[test]
    fn test_manual_lock_respects_timing() {
        let t0 = Instant::now();
        let mut arbiter = ScrollArbiter::new();
        arbiter.attach(Pane::at_bottom(1000.0, 400.0));

        // Small read-back that stays within the near-bottom threshold.
        scroll_user(&mut arbiter, 550.0, t0);
        assert_eq!(arbiter.mode(), FollowMode::ManualOverride);

        assert!(!arbiter.request_scroll_to_bottom(false, ScrollBehavior::Smooth, t0 + ms(1000)));
        assert!(!arbiter.run_frame());

        assert!(arbiter.request_scroll_to_bottom(false, ScrollBehavior::Smooth, t0 + ms(3100)));
        assert_eq!(arbiter.mode(), FollowMode::AutoFollow);
        assert!(arbiter.run_frame());
        assert_eq!(arbiter.viewport().unwrap().offset, 600.0);
        assert_eq!(arbiter.viewport().unwrap().last_behavior, Some(ScrollBehavior::Smooth));
    }

    #[test]
    fn test_rearm_check_stays_manual_when_far_up() {
        let t0 = Instant::now();
        let mut arbiter = ScrollArbiter::new();
        arbiter.attach(Pane::at_bottom(1000.0, 400.0));

        scroll_user(&mut arbiter, 100.0, t0);
        arbiter.advance(t0 + ms(3000));
        assert_eq!(arbiter.mode(), FollowMode::ManualOverride);
        assert_eq!(arbiter.rearm_deadline(), None);

        // One check only: no further automatic re-arm.
        arbiter.viewport_mut().unwrap().offset = 600.0;
        arbiter.advance(t0 + ms(10_000));
        assert_eq!(arbiter.mode(), FollowMode::ManualOverride);
    }

    #[test]
    fn test_latest_manual_scroll_rearms() {
        let t0 = Instant::now();
        let mut arbiter = ScrollArbiter::new();
        arbiter.attach(Pane::at_bottom(1000.0, 400.0));

        scroll_user(&mut arbiter, 550.0, t0);
        scroll_user(&mut arbiter, 500.0, t0 + ms(2000));
        assert_eq!(arbiter.state().last_manual_scroll, Some(t0 + ms(2000)));

        // The first scroll's check never runs.
        arbiter.advance(t0 + ms(3000));
        assert_eq!(arbiter.rearm_deadline(), Some(t0 + ms(5000)));
        assert_eq!(arbiter.mode(), FollowMode::ManualOverride);

        assert!(!arbiter.request_scroll_to_bottom(false, ScrollBehavior::Smooth, t0 + ms(4000)));
        assert!(!arbiter.has_pending_frame());

        arbiter.advance(t0 + ms(5000));
        assert_eq!(arbiter.rearm_deadline(), None);
        assert_eq!(arbiter.mode(), FollowMode::AutoFollow);
        assert!(arbiter.request_scroll_to_bottom(false, ScrollBehavior::Smooth, t0 + ms(5100)));
    }

    #[test]
    fn test_catch_up_requires_delay() {
        let t0 = Instant::now();
        let mut arbiter = ScrollArbiter::new();
        arbiter.attach(Pane::at_bottom(1000.0, 400.0));

        scroll_user(&mut arbiter, 200.0, t0);
        assert_eq!(arbiter.mode(), FollowMode::ManualOverride);

        // Too soon after the manual scroll.
        scroll_user(&mut arbiter, 600.0, t0 + ms(500));
        assert_eq!(arbiter.mode(), FollowMode::ManualOverride);

        scroll_user(&mut arbiter, 200.0, t0 + ms(600));
        scroll_user(&mut arbiter, 590.0, t0 + ms(1700));
        assert_eq!(arbiter.mode(), FollowMode::AutoFollow);
        assert_eq!(arbiter.rearm_deadline(), None);
    }

    #[test]
    fn test_scrolling_down_far_from_bottom_stays_manual() {
        let t0 = Instant::now();
        let mut arbiter = ScrollArbiter::new();
        arbiter.attach(Pane::at_bottom(1000.0, 400.0));
        scroll_user(&mut arbiter, 100.0, t0);
        scroll_user(&mut arbiter, 200.0, t0 + ms(2000));
        assert_eq!(arbiter.mode(), FollowMode::ManualOverride);
    }

    #[test]
    fn test_force_scrolls_without_changing_mode() {
        let t0 = Instant::now();
        let mut arbiter = ScrollArbiter::new();
        arbiter.attach(Pane::at_bottom(1000.0, 400.0));
        scroll_user(&mut arbiter, 100.0, t0);

        assert!(arbiter.request_scroll_to_bottom(true, ScrollBehavior::Instant, t0 + ms(10)));
        assert!(arbiter.run_frame());
        assert_eq!(arbiter.viewport().unwrap().offset, 600.0);
        assert_eq!(arbiter.mode(), FollowMode::ManualOverride);
    }

    #[test]
    fn test_pending_frame_is_superseded() {
        let t0 = Instant::now();
        let mut arbiter = ScrollArbiter::new();
        arbiter.attach(Pane::at_bottom(1000.0, 400.0));

        assert!(arbiter.request_scroll_to_bottom(false, ScrollBehavior::Smooth, t0));
        assert!(arbiter.request_scroll_to_bottom(false, ScrollBehavior::Instant, t0));
        assert!(arbiter.run_frame());
        assert!(!arbiter.run_frame());
        assert_eq!(arbiter.viewport().unwrap().last_behavior, Some(ScrollBehavior::Instant));
    }

    #[test]
    fn test_programmatic_scroll_is_not_manual() {
        let t0 = Instant::now();
        let mut arbiter = ScrollArbiter::new();
        arbiter.attach(Pane::at_bottom(1000.0, 400.0));

        // Content grows, arbiter follows, the resulting scroll event moves down.
        arbiter.viewport_mut().unwrap().height = 1400.0;
        arbiter.request_scroll_to_bottom(false, ScrollBehavior::Instant, t0);
        arbiter.run_frame();
        arbiter.on_scroll(t0 + ms(16));
        assert_eq!(arbiter.mode(), FollowMode::AutoFollow);
    }

    #[test]
    fn test_detached_is_noop() {
        let t0 = Instant::now();
        let mut arbiter: ScrollArbiter<Pane> = ScrollArbiter::new();
        arbiter.on_scroll(t0);
        arbiter.advance(t0);
        assert!(!arbiter.request_scroll_to_bottom(true, ScrollBehavior::Instant, t0));
        assert!(!arbiter.run_frame());
        assert!(!arbiter.is_near_bottom());

        arbiter.attach(Pane::at_bottom(500.0, 100.0));
        assert!(arbiter.request_scroll_to_bottom(true, ScrollBehavior::Instant, t0));
        assert!(arbiter.detach().is_some());
        assert!(!arbiter.has_pending_frame());
    }
}
