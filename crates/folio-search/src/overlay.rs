#![forbid(unsafe_code)]

//! The search overlay component.
//!
//! Owns one [`SearchSession`] in a [`Store`], the debounce and focus timers,
//! and the saved body overflow while the panel is visible. The index itself
//! belongs to the shared [`IndexLoader`].
//!
//! # Invariants
//!
//! 1. The body overflow is overridden exactly while the panel is visible and
//!    the saved value is restored on every exit path, teardown included.
//! 2. At most one debounce timer is pending.
//! 3. Query results and payloads are applied only for the latest ticket.
//! 4. `results` never holds more than `max_results` items.

use core::time::Duration;

use folio_core::event::{Event, EventDisposition, InputSlot, Target};
use folio_runtime::{CancelToken, Listener, Store, SubscriberId, TimerHandle, TimerQueue};

use crate::config::SearchConfig;
use crate::debounce::QueryDebouncer;
use crate::error::IndexError;
use crate::executor::{QueryExecutor, QueryTicket};
use crate::focus::FocusManager;
use crate::host::SearchHost;
use crate::index::{ResultData, ResultHandle};
use crate::loader::{IndexLoader, IndexStatus, LoadOutcome, LoadRequest};
use crate::render::{PanelView, ResultRenderer};
use crate::session::{ResultItem, ResultState, SearchSession};
use crate::shortcut::{Presentation, Shortcut, ShortcutDispatcher};

/// Overflow value that suppresses page scrolling.
const SCROLL_LOCKED: &str = "hidden";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverlayTimer {
    Debounce,
    Focus,
}

/// Incremental search overlay for one page view.
#[derive(Debug)]
pub struct SearchOverlay {
    config: SearchConfig,
    loader: IndexLoader,
    load_events: Listener<LoadOutcome>,
    session: Store<SearchSession>,
    timers: TimerQueue<OverlayTimer>,
    debouncer: QueryDebouncer,
    executor: QueryExecutor,
    focus: FocusManager,
    /// Body overflow saved while the scroll lock is applied.
    saved_overflow: Option<String>,
    lifetime: CancelToken,
}

impl SearchOverlay {
    #[must_use]
    pub fn new(config: SearchConfig, loader: IndexLoader) -> Self {
        let session = SearchSession {
            status: loader.status(),
            ..SearchSession::default()
        };
        Self {
            debouncer: QueryDebouncer::new(config.debounce()),
            load_events: loader.listen(),
            config,
            loader,
            session: Store::new(session),
            timers: TimerQueue::new(),
            executor: QueryExecutor::new(),
            focus: FocusManager::new(),
            saved_overflow: None,
            lifetime: CancelToken::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &SearchSession {
        self.session.get()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.session().is_visible(self.config.mode.is_production())
    }

    /// Whether the body scroll lock is currently applied.
    #[must_use]
    pub fn is_scroll_locked(&self) -> bool {
        self.saved_overflow.is_some()
    }

    /// Token cancelled when this page view ends. Hosts check it before
    /// delivering asynchronous completions.
    #[must_use]
    pub fn lifetime(&self) -> CancelToken {
        self.lifetime.clone()
    }

    /// Queries issued to the index so far.
    #[must_use]
    pub fn queries_issued(&self) -> u64 {
        self.executor.issued()
    }

    #[must_use]
    pub fn view(&self) -> PanelView {
        ResultRenderer::render(self.session(), &self.config)
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&SearchSession) + 'static) -> SubscriberId {
        self.session.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.session.unsubscribe(id)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Dispatch a canonical input event.
    pub fn on_event<H: SearchHost + ?Sized>(
        &mut self,
        now: Duration,
        event: &Event,
        host: &mut H,
    ) -> EventDisposition {
        let disposition = match event {
            Event::Key(key) => match ShortcutDispatcher::classify(key) {
                Some(Shortcut::OpenSearch) => {
                    self.open_from_shortcut(now, host);
                    EventDisposition::Consumed
                }
                Some(Shortcut::Close) => {
                    self.close();
                    EventDisposition::Handled
                }
                None => EventDisposition::Ignored,
            },
            Event::PointerDown(Target::Scrim) if self.is_visible() => {
                self.close();
                EventDisposition::Consumed
            }
            Event::Focus(Target::SearchInput(_)) => {
                self.session.update(|s| s.focused = true);
                self.request_load(host);
                EventDisposition::Handled
            }
            Event::Input {
                target: Target::SearchInput(_),
                value,
            } => {
                self.set_query(now, value);
                EventDisposition::Handled
            }
            Event::Click(Target::MobileToggle) => {
                self.toggle_mobile(now, host);
                EventDisposition::Handled
            }
            Event::Click(Target::SearchResult(id)) => {
                tracing::debug!(result = %id, "search result selected");
                self.close();
                EventDisposition::Handled
            }
            Event::PageLoad => {
                self.teardown(host);
                EventDisposition::Handled
            }
            _ => EventDisposition::Ignored,
        };
        self.sync_scroll_lock(host);
        disposition
    }

    /// Update the echoed query and (re)arm the debounce timer.
    pub fn set_query(&mut self, now: Duration, value: &str) {
        self.session.update(|s| s.query = value.to_owned());
        self.debouncer
            .arm(&mut self.timers, now, OverlayTimer::Debounce);
    }

    fn open_from_shortcut<H: SearchHost + ?Sized>(&mut self, now: Duration, host: &mut H) {
        match Presentation::for_width(host.viewport_width(), self.config.desktop_breakpoint) {
            Presentation::Desktop => {
                self.session.update(|s| s.focused = true);
                self.request_load(host);
                self.focus.focus_now(host, InputSlot::Desktop);
            }
            Presentation::Mobile => {
                self.session.update(|s| s.open = true);
                self.request_load(host);
                self.focus.focus_later(
                    &mut self.timers,
                    now,
                    self.config.mobile_focus_delay(),
                    OverlayTimer::Focus,
                );
            }
        }
    }

    fn toggle_mobile<H: SearchHost + ?Sized>(&mut self, now: Duration, host: &mut H) {
        let was_open = self.session().open;
        self.session.update(|s| s.open = !was_open);
        self.request_load(host);
        if was_open {
            self.focus.cancel(&mut self.timers);
        } else {
            self.focus.focus_later(
                &mut self.timers,
                now,
                self.config.mobile_focus_delay(),
                OverlayTimer::Focus,
            );
        }
    }

    /// Close the panel: clears both the explicit-open and focused states.
    pub fn close(&mut self) {
        self.focus.cancel(&mut self.timers);
        self.session.update(|s| {
            s.open = false;
            s.focused = false;
        });
    }

    /// Ask the shared loader for the index. No-op outside production.
    fn request_load<H: SearchHost + ?Sized>(&mut self, host: &mut H) {
        if !self.config.mode.is_production() {
            return;
        }
        let status = match self.loader.request() {
            LoadRequest::Start => {
                host.import_index(&self.config.index_path);
                IndexStatus::Loading
            }
            LoadRequest::AlreadyLoading => IndexStatus::Loading,
            LoadRequest::Ready => IndexStatus::Ready,
            LoadRequest::Failed => IndexStatus::Error,
        };
        self.session.update(|s| s.status = status);
    }

    /// Observe the loader's completion broadcast.
    pub fn poll_loader(&mut self) {
        if let Some(outcome) = self.load_events.try_recv() {
            let status = match outcome {
                LoadOutcome::Ready => IndexStatus::Ready,
                LoadOutcome::Failed => IndexStatus::Error,
            };
            tracing::debug!(?status, "index load observed");
            self.session.update(|s| s.status = status);
        }
    }

    /// Fire due timers.
    pub fn fire_due<H: SearchHost + ?Sized>(&mut self, now: Duration, host: &mut H) {
        for (handle, timer) in self.timers.pop_due(now) {
            match timer {
                OverlayTimer::Debounce => self.on_debounce(handle, host),
                OverlayTimer::Focus => {
                    self.focus
                        .fire(handle, host, self.config.desktop_breakpoint);
                }
            }
        }
        self.sync_scroll_lock(host);
    }

    fn on_debounce<H: SearchHost + ?Sized>(&mut self, handle: TimerHandle, host: &mut H) {
        if !self.debouncer.fire(handle) || !self.config.mode.is_production() {
            return;
        }
        let query = self.session().query.clone();
        if query.trim().is_empty() {
            self.executor.invalidate();
            self.session.update(|s| s.results.clear());
            return;
        }
        if !self.loader.is_ready() {
            tracing::trace!(query = %query, "index not ready; query dropped");
            self.request_load(host);
            return;
        }
        let ticket = self.executor.begin();
        tracing::debug!(query = %query, ticket = ticket.generation(), "search query issued");
        host.run_query(ticket, &query);
    }

    /// Apply the outcome of a lookup.
    ///
    /// A failure keeps the current results. A success replaces them
    /// wholesale, capped at `max_results`, and starts resolving each item.
    pub fn on_query_complete<H: SearchHost + ?Sized>(
        &mut self,
        ticket: QueryTicket,
        result: Result<Vec<ResultHandle>, IndexError>,
        host: &mut H,
    ) {
        if !self.executor.is_current(ticket) {
            tracing::trace!(ticket = ticket.generation(), "stale query result discarded");
            return;
        }
        let handles = match result {
            Ok(handles) => handles,
            Err(error) => {
                tracing::error!(%error, query = %self.session().query, "search query failed");
                return;
            }
        };
        let items: Vec<ResultItem> = handles
            .into_iter()
            .take(self.config.max_results)
            .map(ResultItem::from)
            .collect();
        let ids: Vec<String> = items.iter().map(|item| item.id.clone()).collect();
        self.session.update(|s| s.results = items);
        for id in &ids {
            host.resolve_result(ticket, id);
        }
    }

    /// Apply one result's payload. Items resolve independently.
    pub fn on_result_resolved(
        &mut self,
        ticket: QueryTicket,
        id: &str,
        result: Result<ResultData, IndexError>,
    ) {
        if !self.executor.is_current(ticket) {
            tracing::trace!(result = %id, "stale result payload discarded");
            return;
        }
        let state = match result {
            Ok(data) => ResultState::Ready(data),
            Err(error) => {
                tracing::warn!(%error, result = %id, "result payload failed");
                ResultState::Failed
            }
        };
        self.session.update(|s| {
            if let Some(item) = s
                .results
                .iter_mut()
                .find(|item| item.id == id && item.state == ResultState::Pending)
            {
                item.state = state;
            }
        });
    }

    /// End this page view: cancel timers and pending work, restore the body
    /// overflow, and reset the session.
    pub fn teardown<H: SearchHost + ?Sized>(&mut self, host: &mut H) {
        self.debouncer.cancel(&mut self.timers);
        self.focus.cancel(&mut self.timers);
        self.timers.clear();
        self.executor.invalidate();
        self.lifetime.renew();
        self.release_scroll_lock(host);
        self.session.set(SearchSession {
            status: self.loader.status(),
            ..SearchSession::default()
        });
    }

    fn sync_scroll_lock<H: SearchHost + ?Sized>(&mut self, host: &mut H) {
        let visible = self.is_visible();
        match (self.saved_overflow.is_some(), visible) {
            (false, true) => {
                let prior = host.body_overflow();
                tracing::trace!(prior = %prior, "body scroll locked");
                host.set_body_overflow(SCROLL_LOCKED);
                self.saved_overflow = Some(prior);
            }
            (true, false) => self.release_scroll_lock(host),
            _ => {}
        }
    }

    fn release_scroll_lock<H: SearchHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(prior) = self.saved_overflow.take() {
            tracing::trace!(prior = %prior, "body scroll restored");
            host.set_body_overflow(&prior);
        }
    }
}
