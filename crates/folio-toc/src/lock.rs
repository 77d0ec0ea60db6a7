#![forbid(unsafe_code)]

//! Programmatic scroll lock.
//!
//! Engaged when the reader jumps to a heading from the table of contents, so
//! that observer callbacks fired mid-animation cannot pull the highlight back
//! to a heading the page is merely scrolling past. At most one lock exists;
//! engaging again replaces the previous one.

use folio_runtime::TimerHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Engaged {
    target: String,
    release_timer: TimerHandle,
}

/// Outcome of checking an engaged lock against the live target position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockVerdict {
    /// No lock is engaged.
    Idle,
    /// The animation is still in flight; keep the target active.
    Hold(String),
    /// The target settled or vanished; release and resolve normally.
    Release,
}

/// The lock state of one tracker.
#[derive(Debug, Clone, Default)]
pub struct ProgrammaticScrollLock {
    engaged: Option<Engaged>,
}

impl ProgrammaticScrollLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engage for `target`. Returns the release timer of a lock this one
    /// replaced, which the caller must cancel.
    pub fn engage(
        &mut self,
        target: impl Into<String>,
        release_timer: TimerHandle,
    ) -> Option<TimerHandle> {
        let target = target.into();
        tracing::debug!(heading = %target, timer = release_timer.id(), "scroll lock engaged");
        self.engaged
            .replace(Engaged {
                target,
                release_timer,
            })
            .map(|old| old.release_timer)
    }

    /// Release the lock. Returns its pending release timer, if it was engaged.
    pub fn release(&mut self) -> Option<TimerHandle> {
        let old = self.engaged.take()?;
        tracing::debug!(heading = %old.target, "scroll lock released");
        Some(old.release_timer)
    }

    #[must_use]
    pub fn is_engaged(&self) -> bool {
        self.engaged.is_some()
    }

    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.engaged.as_ref().map(|e| e.target.as_str())
    }

    #[must_use]
    pub fn release_timer(&self) -> Option<TimerHandle> {
        self.engaged.as_ref().map(|e| e.release_timer)
    }

    /// Compare the target's live top against `expected_top`.
    ///
    /// `live_top` is `None` when the target element no longer exists.
    #[must_use]
    pub fn check(&self, live_top: Option<f64>, expected_top: f64, tolerance: f64) -> LockVerdict {
        let Some(engaged) = &self.engaged else {
            return LockVerdict::Idle;
        };
        match live_top {
            Some(top) if (top - expected_top).abs() > tolerance => {
                LockVerdict::Hold(engaged.target.clone())
            }
            _ => LockVerdict::Release,
        }
    }
}
