#![forbid(unsafe_code)]

//! End-to-end driver: a [`StepProgram`] over a [`SimulatedPage`] with a
//! [`StaticIndex`] answering search requests.
//!
//! Time only moves when the test says so. [`PageDriver::advance`] runs in
//! 16ms frames; each frame advances any smooth scroll, delivers observer
//! batches and async completions, and steps the program.

use std::collections::HashMap;

use core::time::Duration;

use folio_core::event::{Event, InputSlot, Target};
use folio_search::{IndexError, IndexLoader, QueryTicket, SearchIndex, StaticIndex};
use folio_web::{FolioConfig, Message, StepProgram, StepResult};

use crate::page::{Requests, SimulatedPage};

/// One animation frame.
pub const FRAME: Duration = Duration::from_millis(16);

/// Smooth-scroll speed in px per frame.
pub const DEFAULT_SCROLL_SPEED: f64 = 120.0;

/// Upper bound on steps per pump, so a feedback loop fails loudly.
const MAX_PUMP_STEPS: u32 = 64;

/// How the simulated index import behaves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImportBehavior {
    #[default]
    Succeed,
    Fail(String),
    /// Leave the import pending until [`PageDriver::finish_import`].
    Hold,
}

/// Drives one page view end to end.
pub struct PageDriver {
    program: StepProgram<SimulatedPage>,
    index: StaticIndex,
    import: ImportBehavior,
    queries: HashMap<QueryTicket, String>,
    held: Requests,
    async_paused: bool,
    scroll_speed: f64,
}

impl PageDriver {
    /// Mount the components on `page` and deliver the initial observer
    /// callback.
    #[must_use]
    pub fn new(config: FolioConfig, page: SimulatedPage, index: StaticIndex) -> Self {
        let mut driver = Self {
            program: StepProgram::with_loader(config, page, IndexLoader::new()),
            index,
            import: ImportBehavior::Succeed,
            queries: HashMap::new(),
            held: Requests::default(),
            async_paused: false,
            scroll_speed: DEFAULT_SCROLL_SPEED,
        };
        driver.program.init();
        driver.pump();
        driver
    }

    #[must_use]
    pub fn with_import(mut self, behavior: ImportBehavior) -> Self {
        self.import = behavior;
        self
    }

    #[must_use]
    pub fn with_scroll_speed(mut self, px_per_frame: f64) -> Self {
        self.scroll_speed = px_per_frame;
        self
    }

    #[must_use]
    pub fn program(&self) -> &StepProgram<SimulatedPage> {
        &self.program
    }

    pub fn program_mut(&mut self) -> &mut StepProgram<SimulatedPage> {
        &mut self.program
    }

    #[must_use]
    pub fn page(&self) -> &SimulatedPage {
        self.program.host()
    }

    pub fn page_mut(&mut self) -> &mut SimulatedPage {
        self.program.host_mut()
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.program.tracker().active_id()
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.program.now()
    }

    /// Deliver an event and everything it causes.
    pub fn send(&mut self, event: Event) -> StepResult {
        self.program.push_event(event);
        let result = self.program.step();
        self.pump();
        result
    }

    /// Type `text` into the desktop input as one edit.
    pub fn type_query(&mut self, text: &str) -> StepResult {
        self.send(Event::Input {
            target: Target::SearchInput(InputSlot::Desktop),
            value: text.to_owned(),
        })
    }

    /// Wheel-scroll the window to `y`.
    pub fn wheel_to(&mut self, y: f64) {
        self.send(Event::Wheel);
        self.program.host_mut().user_scroll_to(y);
        self.pump();
    }

    /// Run frames for `dt`.
    pub fn advance(&mut self, dt: Duration) {
        let mut remaining = dt;
        while !remaining.is_zero() {
            let slice = remaining.min(FRAME);
            remaining -= slice;
            let speed = self.scroll_speed;
            self.program.host_mut().animate(speed);
            self.program.advance_time(slice);
            self.program.step();
            self.pump();
        }
    }

    /// Run frames until the clock reaches `at`.
    pub fn advance_to(&mut self, at: Duration) {
        let now = self.now();
        if at > now {
            self.advance(at - now);
        }
    }

    /// Run frames until nothing is animating or scheduled, at most `limit`.
    pub fn run_until_idle(&mut self, limit: Duration) {
        let deadline = self.now() + limit;
        while self.now() < deadline
            && (self.page().is_animating() || self.program.next_deadline().is_some())
        {
            self.advance(FRAME);
        }
    }

    /// Stop answering async requests; they accumulate until resumed.
    pub fn pause_async(&mut self) {
        self.async_paused = true;
    }

    /// Answer everything held, in request order, and continue answering.
    pub fn resume_async(&mut self) {
        self.async_paused = false;
        let held = std::mem::take(&mut self.held);
        if self.answer(held) {
            self.program.step();
        }
        self.pump();
    }

    /// Requests held while paused.
    #[must_use]
    pub fn held(&self) -> &Requests {
        &self.held
    }

    /// Answer one held query.
    pub fn deliver_query(&mut self, ticket: QueryTicket) {
        let Some(pos) = self.held.queries.iter().position(|(t, _)| *t == ticket) else {
            return;
        };
        let (ticket, query) = self.held.queries.remove(pos);
        if self.answer(Requests {
            queries: vec![(ticket, query)],
            ..Requests::default()
        }) {
            self.program.step();
        }
        self.pump();
    }

    /// Complete a held import.
    pub fn finish_import(&mut self, result: Result<(), IndexError>) {
        self.held.imports.clear();
        self.program.push(Message::IndexLoaded(result));
        self.program.step();
        self.pump();
    }

    /// Deliver observer batches and async completions until quiet.
    pub fn pump(&mut self) {
        for _ in 0..MAX_PUMP_STEPS {
            if !self.collect() {
                return;
            }
            self.program.step();
        }
        tracing::warn!(steps = MAX_PUMP_STEPS, "pump did not settle");
    }

    /// Move page output into the program. Returns whether anything moved.
    fn collect(&mut self) -> bool {
        let batches = self.program.host_mut().take_batches();
        let requests = self.program.host_mut().take_requests();
        let mut moved = !batches.is_empty();
        for batch in batches {
            self.program.push_visibility(batch);
        }
        if requests.is_empty() {
            return moved;
        }
        if self.async_paused {
            self.held.imports.extend(requests.imports);
            self.held.queries.extend(requests.queries);
            self.held.resolves.extend(requests.resolves);
            return moved;
        }
        moved |= self.answer(requests);
        moved
    }

    fn answer(&mut self, requests: Requests) -> bool {
        let mut queued = false;
        for path in requests.imports {
            let result = match &self.import {
                ImportBehavior::Succeed => Ok(()),
                ImportBehavior::Fail(message) => Err(IndexError::Load {
                    path,
                    message: message.clone(),
                }),
                ImportBehavior::Hold => {
                    self.held.imports.push(path);
                    continue;
                }
            };
            self.program.push(Message::IndexLoaded(result));
            queued = true;
        }
        for (ticket, query) in requests.queries {
            let result = self.index.search(&query);
            self.queries.insert(ticket, query);
            self.program.push(Message::QueryComplete { ticket, result });
            queued = true;
        }
        for (ticket, id) in requests.resolves {
            let query = self.queries.get(&ticket).map_or("", String::as_str);
            let result = self.index.data_for_query(&id, query);
            self.program.push(Message::ResultResolved { ticket, id, result });
            queued = true;
        }
        queued
    }
}
