#![forbid(unsafe_code)]

//! Cancellable one-shot timers driven by an external clock.
//!
//! A [`TimerQueue`] never fires on its own. The owner asks for
//! [`next_deadline`](TimerQueue::next_deadline), arranges to be woken then
//! (a `setTimeout` in the browser, a manual clock advance in tests), and
//! drains due entries with [`pop_due`](TimerQueue::pop_due).
//!
//! # Invariants
//!
//! 1. A cancelled handle never fires, even if its deadline already passed.
//! 2. Due timers fire in deadline order; equal deadlines fire in the order
//!    they were scheduled.
//! 3. Handles are never reused within one queue.

use core::time::Duration;

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Raw id, for logging.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Entry<K> {
    handle: TimerHandle,
    deadline: Duration,
    key: K,
}

/// Deadline queue holding a caller-defined key per timer.
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    next_id: u64,
    entries: Vec<Entry<K>>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TimerQueue<K> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }

    /// Schedule `key` to fire `delay` after `now`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, key: K) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        let deadline = now.saturating_add(delay);
        tracing::trace!(timer = handle.0, ?deadline, "timer scheduled");
        self.entries.push(Entry {
            handle,
            deadline,
            key,
        });
        handle
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        let removed = self.entries.len() != before;
        if removed {
            tracing::trace!(timer = handle.0, "timer cancelled");
        }
        removed
    }

    /// Whether `handle` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    /// Deadline of `handle`, if pending.
    #[must_use]
    pub fn deadline_of(&self, handle: TimerHandle) -> Option<Duration> {
        self.entries
            .iter()
            .find(|entry| entry.handle == handle)
            .map(|entry| entry.deadline)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    /// Remove and return every timer due at `now`, in firing order.
    pub fn pop_due(&mut self, now: Duration) -> Vec<(TimerHandle, K)> {
        let mut due = Vec::new();
        let mut remaining = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.deadline <= now {
                due.push(entry);
            } else {
                remaining.push(entry);
            }
        }
        self.entries = remaining;
        // Handles increase with scheduling order, so they break deadline ties.
        due.sort_by(|a, b| a.deadline.cmp(&b.deadline).then(a.handle.cmp(&b.handle)));
        due.into_iter()
            .map(|entry| (entry.handle, entry.key))
            .collect()
    }

    /// Cancel everything. Returns how many timers were pending.
    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_only_when_due() {
        let mut q = TimerQueue::new();
        q.schedule(ms(0), ms(200), "debounce");
        assert!(q.pop_due(ms(199)).is_empty());
        let fired = q.pop_due(ms(200));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].1, "debounce");
        assert!(q.is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut q = TimerQueue::new();
        let h = q.schedule(ms(0), ms(10), ());
        assert!(q.cancel(h));
        assert!(!q.cancel(h));
        assert!(q.pop_due(ms(1_000)).is_empty());
    }

    #[test]
    fn due_timers_fire_in_deadline_then_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(ms(0), ms(30), 'c');
        q.schedule(ms(0), ms(10), 'a');
        q.schedule(ms(0), ms(10), 'b');
        let order: Vec<char> = q.pop_due(ms(50)).into_iter().map(|(_, k)| k).collect();
        assert_eq!(order, vec!['a', 'b', 'c']);
    }

    #[test]
    fn next_deadline_tracks_earliest_pending() {
        let mut q = TimerQueue::new();
        assert_eq!(q.next_deadline(), None);
        let early = q.schedule(ms(100), ms(100), 1);
        q.schedule(ms(100), ms(2_500), 2);
        assert_eq!(q.next_deadline(), Some(ms(200)));
        q.cancel(early);
        assert_eq!(q.next_deadline(), Some(ms(2_600)));
    }

    #[test]
    fn handles_are_unique() {
        let mut q = TimerQueue::new();
        let a = q.schedule(ms(0), ms(1), ());
        q.pop_due(ms(5));
        let b = q.schedule(ms(0), ms(1), ());
        assert_ne!(a, b);
        assert!(!q.is_pending(a));
        assert!(q.is_pending(b));
    }

    #[test]
    fn clear_reports_pending_count() {
        let mut q = TimerQueue::new();
        q.schedule(ms(0), ms(1), ());
        q.schedule(ms(0), ms(2), ());
        assert_eq!(q.clear(), 2);
        assert_eq!(q.len(), 0);
    }
}
