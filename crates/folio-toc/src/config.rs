#![forbid(unsafe_code)]

//! Tracker configuration.

use core::time::Duration;

use folio_core::geometry::RootMargin;
use serde::{Deserialize, Serialize};

/// Tunables for the heading tracker and its table of contents.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Resting position of a heading after a table-of-contents jump, and the
    /// top of the activation band (px below the viewport top).
    pub activation_offset: f64,
    /// Fraction of the viewport height, measured from the bottom, that is
    /// excluded from the activation band.
    pub release_fraction: f64,
    /// How close (px) the locked target must be to `activation_offset`
    /// before the programmatic lock lets go.
    pub lock_tolerance: f64,
    /// Safety-net release of the programmatic lock, in milliseconds.
    pub lock_timeout_ms: u64,
    /// Fallback scan line (px below the current scroll position).
    pub fallback_offset: f64,
    /// Padding inside the nav's scroll container before an active link is
    /// considered out of view.
    pub nav_padding: f64,
    /// Render the small title row above the list.
    pub show_header: bool,
    /// Accessible label and header text of the nav.
    pub nav_label: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            activation_offset: 80.0,
            release_fraction: 0.6,
            lock_tolerance: 18.0,
            lock_timeout_ms: 2_500,
            fallback_offset: 100.0,
            nav_padding: 12.0,
            show_header: true,
            nav_label: "目录".to_owned(),
        }
    }
}

impl TrackerConfig {
    /// Observer root margin derived from the activation band.
    #[must_use]
    pub fn root_margin(&self) -> RootMargin {
        RootMargin::new(self.activation_offset, self.release_fraction)
    }

    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}
