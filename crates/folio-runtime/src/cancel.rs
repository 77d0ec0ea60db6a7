#![forbid(unsafe_code)]

//! Cancellation flag for asynchronous continuations.
//!
//! Each component lifetime owns one [`CancelToken`]. Anything that completes
//! later (an index import, a query, a per-result payload) captures a clone
//! and checks it before touching component state. Teardown cancels the
//! token; a stale completion then becomes a silent no-op.

use std::cell::Cell;
use std::rc::Rc;

/// Shared, single-threaded cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every clone of this token as cancelled.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Run `f` unless cancelled. Returns `None` when skipped.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        if self.is_cancelled() {
            tracing::trace!("continuation discarded after cancellation");
            None
        } else {
            Some(f())
        }
    }

    /// Cancel this lifetime and start a fresh one in place.
    ///
    /// Clones handed out before the call stay cancelled; the new token is
    /// unrelated to them.
    pub fn renew(&mut self) {
        self.cancel();
        *self = Self::new();
    }
}
