#![forbid(unsafe_code)]

//! Keystroke debouncing over a [`TimerQueue`].

use core::time::Duration;

use folio_runtime::{TimerHandle, TimerQueue};

/// Holds the single pending query execution, if any.
///
/// Arming replaces (and cancels) the previous timer, so only the last
/// keystroke of a burst leads to a query.
#[derive(Debug, Clone)]
pub struct QueryDebouncer {
    delay: Duration,
    pending: Option<TimerHandle>,
}

impl QueryDebouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule an execution `delay` after `now`, cancelling the pending one.
    pub fn arm<K>(&mut self, timers: &mut TimerQueue<K>, now: Duration, key: K) -> TimerHandle {
        self.cancel(timers);
        let handle = timers.schedule(now, self.delay, key);
        self.pending = Some(handle);
        handle
    }

    /// Called when a debounce timer fires. Returns whether it is the current
    /// one, clearing it if so.
    pub fn fire(&mut self, handle: TimerHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel<K>(&mut self, timers: &mut TimerQueue<K>) {
        if let Some(old) = self.pending.take() {
            timers.cancel(old);
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_fires_once_after_quiet_period() {
        let mut timers = TimerQueue::new();
        let mut debounce = QueryDebouncer::new(ms(200));
        debounce.arm(&mut timers, ms(0), ());
        debounce.arm(&mut timers, ms(50), ());
        let last = debounce.arm(&mut timers, ms(120), ());

        assert!(timers.pop_due(ms(319)).is_empty());
        let fired = timers.pop_due(ms(320));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].0, last);
        assert!(debounce.fire(last));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn cancel_clears_pending() {
        let mut timers = TimerQueue::new();
        let mut debounce = QueryDebouncer::new(ms(200));
        let h = debounce.arm(&mut timers, ms(0), ());
        debounce.cancel(&mut timers);
        assert!(!timers.is_pending(h));
        assert!(!debounce.fire(h));
    }
}
