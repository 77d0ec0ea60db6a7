#![forbid(unsafe_code)]

//! Input focus requests.
//!
//! Focus is either immediate or delayed (the mobile panel needs a frame to
//! appear before its input can take focus). Which input receives a delayed
//! focus is decided when the timer fires, from the viewport width at that
//! moment.

use core::time::Duration;

use folio_core::event::InputSlot;
use folio_runtime::{TimerHandle, TimerQueue};

use crate::host::SearchHost;
use crate::shortcut::Presentation;

/// Tracks the single pending delayed focus.
#[derive(Debug, Clone, Default)]
pub struct FocusManager {
    pending: Option<TimerHandle>,
}

impl FocusManager {
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Focus (and select) `slot` right away.
    pub fn focus_now<H: SearchHost + ?Sized>(&mut self, host: &mut H, slot: InputSlot) {
        tracing::trace!(?slot, "focus search input");
        host.focus_input(slot);
    }

    /// Focus the input for the current presentation after `delay`.
    pub fn focus_later<K>(
        &mut self,
        timers: &mut TimerQueue<K>,
        now: Duration,
        delay: Duration,
        key: K,
    ) {
        self.cancel(timers);
        self.pending = Some(timers.schedule(now, delay, key));
    }

    /// A focus timer fired. Focuses the input for the presentation in effect
    /// now, if `handle` is the pending request.
    pub fn fire<H: SearchHost + ?Sized>(&mut self, handle: TimerHandle, host: &mut H, breakpoint: u32) {
        if self.pending != Some(handle) {
            return;
        }
        self.pending = None;
        let slot = Presentation::for_width(host.viewport_width(), breakpoint).input();
        self.focus_now(host, slot);
    }

    pub fn cancel<K>(&mut self, timers: &mut TimerQueue<K>) {
        if let Some(handle) = self.pending.take() {
            timers.cancel(handle);
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
