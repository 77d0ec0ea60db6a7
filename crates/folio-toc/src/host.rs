#![forbid(unsafe_code)]

//! The tracker's view of the page.

use folio_core::geometry::{Bounds, RootMargin};

/// Queries and commands the heading tracker issues against the page.
///
/// Positions are viewport-relative CSS pixels. Observer callbacks are not
/// part of this trait: the host delivers them to
/// [`HeadingTracker::on_visibility`](crate::HeadingTracker::on_visibility)
/// as whole batches.
pub trait TocHost {
    /// Current vertical scroll offset of the window.
    fn scroll_y(&self) -> f64;

    /// Live top of the heading with this anchor id, `None` if it is gone.
    fn heading_top(&self, id: &str) -> Option<f64>;

    /// Bounds of the nav link for `id`.
    fn nav_link_bounds(&self, id: &str) -> Option<Bounds>;

    /// Bounds of the nav's scroll container.
    fn nav_viewport_bounds(&self) -> Option<Bounds>;

    /// Start observing the given headings with one observer.
    fn observe_headings(&mut self, ids: &[String], margin: RootMargin);

    /// Dispose of the observer. Must be a no-op when none exists.
    fn disconnect_observer(&mut self);

    /// Smoothly scroll the window so its top lands at `top`.
    fn scroll_window_to(&mut self, top: f64);

    /// Scroll the nav container by the minimal amount that reveals the link.
    fn scroll_nav_link_into_view(&mut self, id: &str);
}
