//! Viewport geometry as seen by the scroll arbiter.
//!
//! Units are whatever the host scrolls in: pixels for a GUI list, rows for
//! a terminal transcript. Offsets grow downwards from the top of content.

/// How a programmatic scroll should move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Jump straight to the target.
    #[default]
    Instant,
    /// Animate towards the target, if the host supports it.
    Smooth,
}

/// A scrollable region.
pub trait Viewport {
    /// Distance from the top of content to the top of the visible area.
    fn scroll_offset(&self) -> f64;

    /// Total content height.
    fn scroll_height(&self) -> f64;

    /// Visible height.
    fn client_height(&self) -> f64;

    /// Move the visible area so its top sits at `offset`.
    fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior);

    /// Largest meaningful offset (content bottom aligned with view bottom).
    fn max_scroll_offset(&self) -> f64 {
        (self.scroll_height() - self.client_height()).max(0.0)
    }

    /// Distance between the bottom of the visible area and the end of content.
    fn distance_from_bottom(&self) -> f64 {
        (self.scroll_height() - self.scroll_offset() - self.client_height()).max(0.0)
    }
}

impl<V: Viewport + ?Sized> Viewport for &mut V {
    fn scroll_offset(&self) -> f64 {
        (**self).scroll_offset()
    }

    fn scroll_height(&self) -> f64 {
        (**self).scroll_height()
    }

    fn client_height(&self) -> f64 {
        (**self).client_height()
    }

    fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior) {
        (**self).scroll_to(offset, behavior);
    }
}
