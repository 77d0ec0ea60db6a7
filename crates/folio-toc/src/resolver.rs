#![forbid(unsafe_code)]

//! Active-heading resolution.
//!
//! Runs after every observer batch has been applied to the
//! [`VisibilityMap`]. Three rules, in priority order:
//!
//! 1. An engaged programmatic lock holds its target while the target is
//!    still outside tolerance of the resting line.
//! 2. Otherwise the intersecting heading with the smallest recorded top wins.
//!    Equal tops go to the heading earlier in the document.
//! 3. With nothing intersecting, the last heading at or above
//!    `scrollY + fallback_offset` wins. If none qualifies the active heading
//!    is left alone.

use crate::config::TrackerConfig;
use crate::heading::HeadingEntry;
use crate::lock::{LockVerdict, ProgrammaticScrollLock};
use crate::visibility::VisibilityMap;

/// Which rule picked the heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Rule 1: the lock is holding its target.
    Locked(String),
    /// Rule 2.
    Visible(String),
    /// Rule 3.
    Fallback(String),
    /// Nothing qualified; keep the current active heading.
    Unchanged,
}

impl Resolution {
    /// The chosen heading id, if any.
    #[must_use]
    pub fn heading(&self) -> Option<&str> {
        match self {
            Self::Locked(id) | Self::Visible(id) | Self::Fallback(id) => Some(id),
            Self::Unchanged => None,
        }
    }
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub resolution: Resolution,
    /// The lock settled or lost its target and must be released.
    pub release_lock: bool,
}

/// Stateless resolver parameterized by the tracker config.
#[derive(Debug, Clone, Copy)]
pub struct ActiveHeadingResolver {
    expected_top: f64,
    tolerance: f64,
    fallback_offset: f64,
}

impl ActiveHeadingResolver {
    #[must_use]
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            expected_top: config.activation_offset,
            tolerance: config.lock_tolerance,
            fallback_offset: config.fallback_offset,
        }
    }

    /// Resolve the active heading.
    ///
    /// `live_top` returns the current viewport-relative top of a heading, or
    /// `None` if the element is gone.
    pub fn resolve(
        &self,
        headings: &[HeadingEntry],
        visibility: &VisibilityMap,
        lock: &ProgrammaticScrollLock,
        live_top: impl Fn(&str) -> Option<f64>,
    ) -> Decision {
        let mut release_lock = false;
        if let Some(target) = lock.target() {
            match lock.check(live_top(target), self.expected_top, self.tolerance) {
                LockVerdict::Hold(id) => {
                    return Decision {
                        resolution: Resolution::Locked(id),
                        release_lock: false,
                    };
                }
                LockVerdict::Release => release_lock = true,
                LockVerdict::Idle => {}
            }
        }

        let resolution = match self.topmost_visible(headings, visibility) {
            Some(id) => Resolution::Visible(id.to_owned()),
            None => self
                .fallback(headings, &live_top)
                .map_or(Resolution::Unchanged, |id| Resolution::Fallback(id.to_owned())),
        };
        Decision {
            resolution,
            release_lock,
        }
    }

    /// Rule 2.
    #[must_use]
    pub fn topmost_visible<'a>(
        &self,
        headings: &'a [HeadingEntry],
        visibility: &VisibilityMap,
    ) -> Option<&'a str> {
        let mut best: Option<(&'a str, f64)> = None;
        for heading in headings {
            let Some(record) = visibility.get(&heading.id) else {
                continue;
            };
            if !record.is_intersecting {
                continue;
            }
            if best.is_none_or(|(_, top)| record.top_offset < top) {
                best = Some((&heading.id, record.top_offset));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Rule 3. Compares viewport-relative tops, which is the same as
    /// comparing absolute positions against `scrollY + fallback_offset`.
    #[must_use]
    pub fn fallback<'a>(
        &self,
        headings: &'a [HeadingEntry],
        live_top: impl Fn(&str) -> Option<f64>,
    ) -> Option<&'a str> {
        let mut best: Option<(&'a str, f64)> = None;
        for heading in headings {
            let Some(top) = live_top(&heading.id) else {
                continue;
            };
            if top > self.fallback_offset {
                continue;
            }
            if best.is_none_or(|(_, best_top)| top > best_top) {
                best = Some((&heading.id, top));
            }
        }
        best.map(|(id, _)| id)
    }
}
