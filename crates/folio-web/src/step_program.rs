#![forbid(unsafe_code)]

//! Step-based runner for the page components.
//!
//! [`StepProgram`] owns the [`HeadingTracker`], the [`SearchOverlay`], a
//! [`DeterministicClock`] and a FIFO of pending [`Message`]s. Nothing runs on
//! its own; the host controls the loop:
//!
//! 1. Queue input and async completions via [`StepProgram::push_event`],
//!    [`StepProgram::push_visibility`], [`StepProgram::push`].
//! 2. Advance time via [`StepProgram::advance_time`] or
//!    [`StepProgram::set_time`].
//! 3. Call [`StepProgram::step`].
//! 4. Schedule the next step at [`StepProgram::next_deadline`].
//!
//! # Example
//!
//! ```ignore
//! use folio_web::{FolioConfig, StepProgram};
//! use folio_core::event::Event;
//! use core::time::Duration;
//!
//! let mut prog = StepProgram::new(FolioConfig::default(), page);
//! prog.init();
//!
//! prog.push_event(Event::Wheel);
//! prog.advance_time(Duration::from_millis(16));
//! let result = prog.step();
//! if result.disposition.is_consumed() {
//!     // preventDefault on the native event
//! }
//! ```

use std::collections::VecDeque;

use core::time::Duration;

use folio_core::event::{Event, EventDisposition};
use folio_runtime::{Clock, DeterministicClock};
use folio_search::{
    IndexError, IndexLoader, PanelView, QueryTicket, ResultData, ResultHandle, SearchHost,
    SearchOverlay,
};
use folio_toc::{HeadingSource, HeadingTracker, TocHost, TocView, VisibilityRecord};

use crate::config::FolioConfig;

/// Input and completions delivered to the components.
#[derive(Debug)]
pub enum Message {
    /// A canonical input event.
    Event(Event),
    /// One intersection observer callback.
    Visibility(Vec<VisibilityRecord>),
    /// The index import finished.
    IndexLoaded(Result<(), IndexError>),
    /// A lookup finished.
    QueryComplete {
        ticket: QueryTicket,
        result: Result<Vec<ResultHandle>, IndexError>,
    },
    /// One result payload finished resolving.
    ResultResolved {
        ticket: QueryTicket,
        id: String,
        result: Result<ResultData, IndexError>,
    },
}

impl From<Event> for Message {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

/// Result of a single [`StepProgram::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Messages applied during this step.
    pub messages_processed: u32,
    /// Strongest disposition among the events applied.
    pub disposition: EventDisposition,
    /// When the host should step again, if anything is pending.
    pub next_deadline: Option<Duration>,
    /// Monotonically increasing step index.
    pub step_idx: u64,
}

/// Host-driven runner for one page's components.
///
/// Dropping the program runs [`shutdown`](StepProgram::shutdown), so the
/// body overflow and the heading observer are released even when the host
/// never tears it down explicitly.
pub struct StepProgram<H: TocHost + SearchHost + HeadingSource> {
    host: H,
    tracker: HeadingTracker,
    overlay: SearchOverlay,
    loader: IndexLoader,
    clock: DeterministicClock,
    queue: VecDeque<Message>,
    initialized: bool,
    step_idx: u64,
}

impl<H> StepProgram<H>
where
    H: TocHost + SearchHost + HeadingSource,
{
    /// Create a runner that shares the process-wide index loader.
    #[must_use]
    pub fn new(config: FolioConfig, host: H) -> Self {
        Self::with_loader(config, host, IndexLoader::global())
    }

    /// Create a runner with an explicit loader.
    #[must_use]
    pub fn with_loader(config: FolioConfig, host: H, loader: IndexLoader) -> Self {
        Self {
            tracker: HeadingTracker::new(config.toc),
            overlay: SearchOverlay::new(config.search, loader.clone()),
            loader,
            host,
            clock: DeterministicClock::new(),
            queue: VecDeque::new(),
            initialized: false,
            step_idx: 0,
        }
    }

    /// Set up both components for the current document.
    ///
    /// Equivalent to delivering [`Event::PageLoad`]. Calling it again is
    /// harmless; use [`page_load`](Self::page_load) after soft navigation.
    pub fn init(&mut self) -> EventDisposition {
        if self.initialized {
            return EventDisposition::Ignored;
        }
        self.initialized = true;
        self.page_load()
    }

    /// Re-collect headings and reset the search session.
    pub fn page_load(&mut self) -> EventDisposition {
        self.initialized = true;
        let now = self.clock.now_mono();
        tracing::debug!(now_ms = now.as_millis() as u64, "page load");
        self.dispatch_event(now, &Event::PageLoad)
    }

    /// Queue a message for the next [`step`](Self::step).
    pub fn push(&mut self, message: impl Into<Message>) {
        self.queue.push_back(message.into());
    }

    /// Queue an input event.
    pub fn push_event(&mut self, event: Event) {
        self.queue.push_back(Message::Event(event));
    }

    /// Queue one observer callback.
    pub fn push_visibility(&mut self, batch: Vec<VisibilityRecord>) {
        self.queue.push_back(Message::Visibility(batch));
    }

    /// Apply queued messages, then due timers, then the index broadcast.
    pub fn step(&mut self) -> StepResult {
        let now = self.clock.now_mono();
        let mut messages_processed: u32 = 0;
        let mut disposition = EventDisposition::Ignored;

        while let Some(message) = self.queue.pop_front() {
            messages_processed += 1;
            disposition = disposition.merge(self.apply(now, message));
        }

        self.tracker.fire_due(now);
        self.overlay.fire_due(now, &mut self.host);
        self.overlay.poll_loader();

        self.step_idx += 1;
        StepResult {
            messages_processed,
            disposition,
            next_deadline: self.next_deadline(),
            step_idx: self.step_idx,
        }
    }

    /// Push one event and step immediately. Hosts use this from native event
    /// listeners so the disposition is known before the listener returns.
    pub fn dispatch(&mut self, event: Event) -> StepResult {
        self.push_event(event);
        self.step()
    }

    /// Advance the deterministic clock by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set the deterministic clock to an absolute time.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now_mono()
    }

    /// Earliest timer deadline across both components.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.tracker.next_deadline(), self.overlay.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Messages waiting for the next step.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub fn step_idx(&self) -> u64 {
        self.step_idx
    }

    #[must_use]
    pub fn tracker(&self) -> &HeadingTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut HeadingTracker {
        &mut self.tracker
    }

    #[must_use]
    pub fn overlay(&self) -> &SearchOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut SearchOverlay {
        &mut self.overlay
    }

    #[must_use]
    pub fn loader(&self) -> &IndexLoader {
        &self.loader
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Table-of-contents view, `None` when the page has no headings.
    #[must_use]
    pub fn toc_view(&self) -> Option<TocView> {
        self.tracker.view()
    }

    #[must_use]
    pub fn panel_view(&self) -> PanelView {
        self.overlay.view()
    }

    /// Tear both components down, releasing observers, timers and the scroll
    /// lock. Queued messages are dropped.
    pub fn shutdown(&mut self) {
        let dropped = self.queue.len();
        self.queue.clear();
        self.tracker.teardown(&mut self.host);
        self.overlay.teardown(&mut self.host);
        self.initialized = false;
        tracing::debug!(dropped, "step program shut down");
    }

    // --- Private helpers ---

    fn apply(&mut self, now: Duration, message: Message) -> EventDisposition {
        match message {
            Message::Event(event) => self.dispatch_event(now, &event),
            Message::Visibility(batch) => {
                self.tracker.on_visibility(&batch, &mut self.host);
                EventDisposition::Ignored
            }
            Message::IndexLoaded(result) => {
                self.loader.complete(result);
                EventDisposition::Ignored
            }
            Message::QueryComplete { ticket, result } => {
                self.overlay
                    .on_query_complete(ticket, result, &mut self.host);
                EventDisposition::Ignored
            }
            Message::ResultResolved { ticket, id, result } => {
                self.overlay.on_result_resolved(ticket, &id, result);
                EventDisposition::Ignored
            }
        }
    }

    fn dispatch_event(&mut self, now: Duration, event: &Event) -> EventDisposition {
        let toc = self.tracker.on_event(now, event, &mut self.host);
        let search = self.overlay.on_event(now, event, &mut self.host);
        toc.merge(search)
    }
}

impl<H: TocHost + SearchHost + HeadingSource> Drop for StepProgram<H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use folio_core::event::{InputSlot, KeyCode, KeyEvent, Modifiers, Target};
    use folio_core::geometry::{Bounds, RootMargin};
    use folio_toc::RawHeading;
    use pretty_assertions::assert_eq;

    /// Minimal page: two headings, fixed positions, records commands.
    #[derive(Default)]
    struct Page {
        scroll_y: f64,
        observed: Vec<String>,
        scrolled_to: Vec<f64>,
        overflow: Rc<RefCell<String>>,
        imports: u32,
        queries: Vec<(QueryTicket, String)>,
        resolves: Vec<(QueryTicket, String)>,
    }

    impl HeadingSource for Page {
        fn raw_headings(&self) -> Option<Vec<RawHeading>> {
            Some(vec![
                RawHeading::new(2, "one", "One"),
                RawHeading::new(2, "two", "Two"),
            ])
        }
    }

    impl TocHost for Page {
        fn scroll_y(&self) -> f64 {
            self.scroll_y
        }
        fn heading_top(&self, id: &str) -> Option<f64> {
            let abs = match id {
                "one" => 300.0,
                "two" => 1_500.0,
                _ => return None,
            };
            Some(abs - self.scroll_y)
        }
        fn nav_link_bounds(&self, _id: &str) -> Option<Bounds> {
            Some(Bounds::new(10.0, 30.0))
        }
        fn nav_viewport_bounds(&self) -> Option<Bounds> {
            Some(Bounds::new(0.0, 400.0))
        }
        fn observe_headings(&mut self, ids: &[String], _margin: RootMargin) {
            self.observed = ids.to_vec();
        }
        fn disconnect_observer(&mut self) {
            self.observed.clear();
        }
        fn scroll_window_to(&mut self, top: f64) {
            self.scrolled_to.push(top);
            self.scroll_y = top;
        }
        fn scroll_nav_link_into_view(&mut self, _id: &str) {}
    }

    impl SearchHost for Page {
        fn viewport_width(&self) -> u32 {
            1280
        }
        fn focus_input(&mut self, _slot: InputSlot) {}
        fn body_overflow(&self) -> String {
            self.overflow.borrow().clone()
        }
        fn set_body_overflow(&mut self, value: &str) {
            *self.overflow.borrow_mut() = value.to_owned();
        }
        fn import_index(&mut self, _path: &str) {
            self.imports += 1;
        }
        fn run_query(&mut self, ticket: QueryTicket, query: &str) {
            self.queries.push((ticket, query.to_owned()));
        }
        fn resolve_result(&mut self, ticket: QueryTicket, id: &str) {
            self.resolves.push((ticket, id.to_owned()));
        }
    }

    fn program() -> StepProgram<Page> {
        let mut prog =
            StepProgram::with_loader(FolioConfig::default(), Page::default(), IndexLoader::new());
        prog.init();
        prog
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn init_observes_headings_once() {
        let mut prog = program();
        assert!(prog.is_initialized());
        assert_eq!(prog.host().observed, vec!["one", "two"]);
        assert_eq!(prog.init(), EventDisposition::Ignored);
        assert_eq!(prog.toc_view().map(|v| v.items.len()), Some(2));
    }

    #[test]
    fn step_applies_messages_in_order() {
        let mut prog = program();
        prog.push_visibility(vec![VisibilityRecord::new("one", true, 120.0)]);
        prog.push_visibility(vec![
            VisibilityRecord::new("one", false, -40.0),
            VisibilityRecord::new("two", true, 200.0),
        ]);
        let result = prog.step();
        assert_eq!(result.messages_processed, 2);
        assert_eq!(prog.tracker().active_id(), Some("two"));
    }

    #[test]
    fn nav_click_is_consumed_and_schedules_release() {
        let mut prog = program();
        let result = prog.dispatch(Event::Click(Target::NavLink("two".into())));
        assert_eq!(result.disposition, EventDisposition::Consumed);
        assert_eq!(prog.host().scrolled_to, vec![1_420.0]);
        assert_eq!(result.next_deadline, Some(ms(2_500)));
        assert!(prog.tracker().is_locked());

        prog.set_time(ms(2_500));
        let result = prog.step();
        assert!(!prog.tracker().is_locked());
        assert_eq!(result.next_deadline, None);
    }

    #[test]
    fn index_completion_is_applied_before_due_timers() {
        let mut prog = program();
        prog.dispatch(Event::Focus(Target::SearchInput(InputSlot::Desktop)));
        prog.push_event(Event::Input {
            target: Target::SearchInput(InputSlot::Desktop),
            value: "rust".into(),
        });
        prog.step();
        assert_eq!(prog.next_deadline(), Some(ms(200)));

        prog.push(Message::IndexLoaded(Ok(())));
        prog.set_time(ms(200));
        prog.step();
        assert!(prog.loader().is_ready());
        assert_eq!(prog.host().queries.len(), 1);
        assert_eq!(
            prog.overlay().session().status,
            folio_search::IndexStatus::Ready
        );
    }

    #[test]
    fn async_completions_flow_through_queue() {
        let mut prog = program();
        prog.dispatch(Event::Focus(Target::SearchInput(InputSlot::Desktop)));
        assert_eq!(prog.host().imports, 1);
        prog.push(Message::IndexLoaded(Ok(())));
        prog.step();

        prog.dispatch(Event::Input {
            target: Target::SearchInput(InputSlot::Desktop),
            value: "post".into(),
        });
        prog.set_time(ms(200));
        prog.step();
        let (ticket, query) = prog.host().queries[0].clone();
        assert_eq!(query, "post");

        prog.push(Message::QueryComplete {
            ticket,
            result: Ok(vec![ResultHandle::new("/a/")]),
        });
        prog.step();
        assert_eq!(prog.host().resolves, vec![(ticket, "/a/".to_owned())]);

        prog.push(Message::ResultResolved {
            ticket,
            id: "/a/".into(),
            result: Ok(ResultData {
                url: "/a/".into(),
                title: Some("A".into()),
                meta_title: None,
                excerpt_html: String::new(),
            }),
        });
        prog.step();
        assert!(prog.panel_view().visible);
        assert!(prog.panel_view().to_html().contains("href=\"/a/\""));
    }

    #[test]
    fn shortcut_is_consumed_and_locks_scroll() {
        let mut prog = program();
        *prog.host().overflow.borrow_mut() = "visible".into();
        let chord = KeyEvent::new(KeyCode::Char('k')).with_modifiers(Modifiers::SUPER);
        let result = prog.dispatch(Event::Key(chord));
        assert!(result.disposition.is_consumed());

        prog.dispatch(Event::Input {
            target: Target::SearchInput(InputSlot::Desktop),
            value: "x".into(),
        });
        assert_eq!(*prog.host().overflow.borrow(), "hidden");

        prog.dispatch(Event::Key(KeyEvent::new(KeyCode::Escape)));
        assert_eq!(*prog.host().overflow.borrow(), "visible");
    }

    #[test]
    fn dropping_the_program_restores_body_overflow() {
        let body = Rc::new(RefCell::new("auto".to_owned()));
        let page = Page {
            overflow: Rc::clone(&body),
            ..Page::default()
        };
        let mut prog = StepProgram::with_loader(FolioConfig::default(), page, IndexLoader::new());
        prog.init();
        prog.dispatch(Event::Focus(Target::SearchInput(InputSlot::Desktop)));
        prog.dispatch(Event::Input {
            target: Target::SearchInput(InputSlot::Desktop),
            value: "rust".into(),
        });
        assert!(prog.panel_view().visible);
        assert_eq!(*body.borrow(), "hidden");

        drop(prog);
        assert_eq!(*body.borrow(), "auto");
    }

    #[test]
    fn shutdown_releases_everything() {
        let mut prog = program();
        prog.dispatch(Event::Click(Target::NavLink("one".into())));
        prog.push_event(Event::Wheel);
        prog.shutdown();
        assert_eq!(prog.pending(), 0);
        assert!(prog.host().observed.is_empty());
        assert_eq!(prog.next_deadline(), None);
        assert!(!prog.is_initialized());
    }
}
