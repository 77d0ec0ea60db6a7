#![forbid(unsafe_code)]

//! Vertical geometry primitives.
//!
//! Everything the components measure is a vertical span in CSS pixels,
//! relative to the viewport top unless stated otherwise (the same frame as
//! `getBoundingClientRect`). Horizontal extent never matters for reading
//! position, so it is not modelled.

use serde::{Deserialize, Serialize};

/// A vertical span `[top, bottom]` in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Top edge.
    pub top: f64,
    /// Bottom edge. Never above `top` when built through the constructors.
    pub bottom: f64,
}

impl Bounds {
    /// Create a span, swapping the edges if given in the wrong order.
    #[inline]
    #[must_use]
    pub fn new(top: f64, bottom: f64) -> Self {
        if bottom < top {
            Self {
                top: bottom,
                bottom: top,
            }
        } else {
            Self { top, bottom }
        }
    }

    /// Create a span from its top edge and height.
    #[inline]
    #[must_use]
    pub fn from_top_height(top: f64, height: f64) -> Self {
        Self::new(top, top + height.max(0.0))
    }

    /// Height of the span.
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Shift the span by `dy` pixels.
    #[inline]
    #[must_use]
    pub fn translate(&self, dy: f64) -> Self {
        Self {
            top: self.top + dy,
            bottom: self.bottom + dy,
        }
    }

    /// Shrink both edges inward by `padding`. Collapses to the midpoint
    /// instead of inverting.
    #[must_use]
    pub fn inset(&self, padding: f64) -> Self {
        let top = self.top + padding;
        let bottom = self.bottom - padding;
        if bottom < top {
            let mid = (self.top + self.bottom) / 2.0;
            Self {
                top: mid,
                bottom: mid,
            }
        } else {
            Self { top, bottom }
        }
    }

    /// Whether two spans touch or overlap. Edge-adjacent spans count, which
    /// matches a zero-threshold intersection observer.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.top <= other.bottom && other.top <= self.bottom
    }

    /// Whether `inner` lies fully inside this span.
    #[inline]
    #[must_use]
    pub fn contains(&self, inner: &Bounds) -> bool {
        inner.top >= self.top && inner.bottom <= self.bottom
    }
}

/// Margins that shrink the viewport into the observer's root area.
///
/// The top edge moves down by a fixed pixel amount; the bottom edge moves up
/// by a fraction of the viewport height. With the defaults a heading counts as
/// "in view" from 80px below the viewport top until it has travelled 60% of
/// the way up, which approximates the section currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootMargin {
    /// Pixels removed from the top of the viewport.
    pub top_px: f64,
    /// Fraction of the viewport height removed from the bottom.
    pub bottom_fraction: f64,
}

impl Default for RootMargin {
    fn default() -> Self {
        Self {
            top_px: 80.0,
            bottom_fraction: 0.6,
        }
    }
}

impl RootMargin {
    /// Create a root margin.
    #[must_use]
    pub const fn new(top_px: f64, bottom_fraction: f64) -> Self {
        Self {
            top_px,
            bottom_fraction,
        }
    }

    /// The root area for a viewport of `viewport_height` pixels.
    #[must_use]
    pub fn root_area(&self, viewport_height: f64) -> Bounds {
        let bottom = viewport_height * (1.0 - self.bottom_fraction.clamp(0.0, 1.0));
        Bounds::new(self.top_px, bottom.max(self.top_px))
    }

    /// Whether an element at `target` (viewport-relative) is intersecting.
    #[must_use]
    pub fn intersects(&self, target: &Bounds, viewport_height: f64) -> bool {
        self.root_area(viewport_height).intersects(target)
    }

    /// CSS `rootMargin` string for an `IntersectionObserver`.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!(
            "-{}px 0px -{}% 0px",
            trim_float(self.top_px),
            trim_float(self.bottom_fraction * 100.0)
        )
    }
}

fn trim_float(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
