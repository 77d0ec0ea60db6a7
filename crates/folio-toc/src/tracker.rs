#![forbid(unsafe_code)]

//! The heading tracker component.
//!
//! # Lifecycle
//!
//! ```text
//! PageLoad ──► teardown ──► collect ──► (no headings) ──► disabled
//!                               │
//!                               └──► observe_headings ──► tracking
//! ```
//!
//! While tracking, observer batches, nav-link clicks, manual-scroll intent
//! and lock timeouts are applied in the order the host delivers them. Every
//! change of the active heading goes through the [`Store`] so renderers can
//! subscribe, and triggers a minimal nav auto-scroll.

use core::time::Duration;

use folio_core::event::{Event, EventDisposition, Target};
use folio_runtime::{Store, SubscriberId, TimerQueue};

use crate::config::TrackerConfig;
use crate::heading::{HeadingCollector, HeadingEntry, HeadingSource};
use crate::host::TocHost;
use crate::lock::ProgrammaticScrollLock;
use crate::nav::{NavRenderer, TocView};
use crate::resolver::{ActiveHeadingResolver, Resolution};
use crate::visibility::{VisibilityMap, VisibilityRecord};

/// The currently highlighted heading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveState {
    pub active_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackerTimer {
    LockRelease,
}

/// Reading-position synchronizer for one page view.
#[derive(Debug)]
pub struct HeadingTracker {
    config: TrackerConfig,
    resolver: ActiveHeadingResolver,
    headings: Vec<HeadingEntry>,
    visibility: VisibilityMap,
    active: Store<ActiveState>,
    lock: ProgrammaticScrollLock,
    timers: TimerQueue<TrackerTimer>,
    observing: bool,
}

impl HeadingTracker {
    #[must_use]
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            resolver: ActiveHeadingResolver::new(&config),
            config,
            headings: Vec::new(),
            visibility: VisibilityMap::new(),
            active: Store::default(),
            lock: ProgrammaticScrollLock::new(),
            timers: TimerQueue::new(),
            observing: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Tracked headings of the current page, in document order.
    #[must_use]
    pub fn headings(&self) -> &[HeadingEntry] {
        &self.headings
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active.get().active_id.as_deref()
    }

    /// Whether a programmatic scroll lock is engaged.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock.is_engaged()
    }

    /// Whether an observer is registered for the current page.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Register a renderer for active-heading changes.
    pub fn subscribe(&mut self, callback: impl FnMut(&ActiveState) + 'static) -> SubscriberId {
        self.active.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.active.unsubscribe(id)
    }

    /// Current nav view, `None` when the page has no headings.
    #[must_use]
    pub fn view(&self) -> Option<TocView> {
        NavRenderer::render(&self.headings, self.active_id(), &self.config)
    }

    /// Earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Collect headings for the current document and start observing them.
    ///
    /// Any previous page state is torn down first.
    pub fn init<S, H>(&mut self, source: &S, host: &mut H)
    where
        S: HeadingSource + ?Sized,
        H: TocHost + ?Sized,
    {
        let headings = HeadingCollector::collect(source);
        self.rebuild(headings, host);
    }

    fn rebuild<H: TocHost + ?Sized>(&mut self, headings: Vec<HeadingEntry>, host: &mut H) {
        self.teardown(host);
        self.headings = headings;
        if self.headings.is_empty() {
            tracing::debug!("no headings; tracker idle");
            return;
        }
        let ids: Vec<String> = self.headings.iter().map(|h| h.id.clone()).collect();
        host.observe_headings(&ids, self.config.root_margin());
        self.observing = true;
        tracing::debug!(count = ids.len(), "observing headings");
    }

    /// Reverse every side effect of the current page view.
    pub fn teardown<H: TocHost + ?Sized>(&mut self, host: &mut H) {
        if self.observing {
            host.disconnect_observer();
            self.observing = false;
        }
        self.release_lock("teardown");
        let cancelled = self.timers.clear();
        if cancelled > 0 {
            tracing::trace!(cancelled, "tracker timers cancelled");
        }
        self.visibility.clear();
        self.headings.clear();
        self.active.set(ActiveState::default());
    }

    /// Dispatch a canonical input event.
    pub fn on_event<H>(&mut self, now: Duration, event: &Event, host: &mut H) -> EventDisposition
    where
        H: TocHost + HeadingSource + ?Sized,
    {
        match event {
            Event::PageLoad => {
                let headings = HeadingCollector::collect(&*host);
                self.rebuild(headings, host);
                EventDisposition::Handled
            }
            Event::Click(Target::NavLink(id)) if !self.headings.is_empty() => {
                self.jump_to(now, id, host)
            }
            event if event.is_user_intent() => {
                if self.release_lock("user input") {
                    EventDisposition::Handled
                } else {
                    EventDisposition::Ignored
                }
            }
            _ => EventDisposition::Ignored,
        }
    }

    /// Jump to a heading from the table of contents.
    ///
    /// The window scrolls smoothly so the heading rests at the activation
    /// line, the heading becomes active immediately, and a lock keeps it
    /// active until the scroll settles or the lock times out. A heading that
    /// no longer exists is ignored. The native click is always consumed so
    /// the browser does not perform its own jump.
    pub fn jump_to<H: TocHost + ?Sized>(
        &mut self,
        now: Duration,
        id: &str,
        host: &mut H,
    ) -> EventDisposition {
        let Some(top) = host.heading_top(id) else {
            tracing::debug!(heading = %id, "nav target missing; ignoring click");
            return EventDisposition::Consumed;
        };
        self.release_lock("superseded");

        let timer = self
            .timers
            .schedule(now, self.config.lock_timeout(), TrackerTimer::LockRelease);
        self.lock.engage(id, timer);

        let target = top + host.scroll_y() - self.config.activation_offset;
        host.scroll_window_to(target);
        self.set_active(Some(id.to_owned()), host);
        EventDisposition::Consumed
    }

    /// Apply one observer batch, then resolve the active heading.
    pub fn on_visibility<H: TocHost + ?Sized>(&mut self, batch: &[VisibilityRecord], host: &mut H) {
        if !self.observing {
            tracing::trace!(len = batch.len(), "visibility batch without observer; dropped");
            return;
        }
        self.visibility.apply_batch(batch);

        let decision = {
            let live = &*host;
            self.resolver
                .resolve(&self.headings, &self.visibility, &self.lock, |id| {
                    live.heading_top(id)
                })
        };
        if decision.release_lock {
            self.release_lock("settled");
        }
        match decision.resolution {
            Resolution::Locked(id) | Resolution::Visible(id) | Resolution::Fallback(id) => {
                self.set_active(Some(id), host);
            }
            Resolution::Unchanged => {}
        }
    }

    /// Fire due timers.
    pub fn fire_due(&mut self, now: Duration) {
        for (handle, timer) in self.timers.pop_due(now) {
            match timer {
                TrackerTimer::LockRelease => {
                    if self.lock.release_timer() == Some(handle) {
                        self.lock.release();
                        tracing::debug!("scroll lock timed out");
                    }
                }
            }
        }
    }

    /// Release the lock and cancel its timer. Returns whether it was engaged.
    fn release_lock(&mut self, reason: &'static str) -> bool {
        match self.lock.release() {
            Some(timer) => {
                self.timers.cancel(timer);
                tracing::trace!(reason, "lock release");
                true
            }
            None => false,
        }
    }

    fn set_active<H: TocHost + ?Sized>(&mut self, active_id: Option<String>, host: &mut H) {
        if !self.active.set(ActiveState {
            active_id: active_id.clone(),
        }) {
            return;
        }
        let Some(id) = active_id else {
            return;
        };
        tracing::debug!(heading = %id, "active heading changed");
        self.reveal_in_nav(&id, host);
    }

    fn reveal_in_nav<H: TocHost + ?Sized>(&self, id: &str, host: &mut H) {
        let (Some(link), Some(container)) = (host.nav_link_bounds(id), host.nav_viewport_bounds())
        else {
            return;
        };
        if NavRenderer::link_out_of_view(&link, &container, self.config.nav_padding) {
            host.scroll_nav_link_into_view(id);
        }
    }
}

impl Default for HeadingTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}
