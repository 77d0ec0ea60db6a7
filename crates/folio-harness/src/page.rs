#![forbid(unsafe_code)]

//! A pure-Rust page model.
//!
//! [`SimulatedPage`] stands in for a browser tab: an article with headings at
//! fixed document positions, a window that scrolls (instantly for the user,
//! animated for programmatic smooth scrolls), a fixed sidebar table of
//! contents with its own scroll offset, an intersection observer that reports
//! state changes in batches, and the body/input state the search overlay
//! touches. Asynchronous requests are recorded, not performed; the
//! [`PageDriver`](crate::PageDriver) answers them.

use std::collections::{HashMap, VecDeque};

use folio_core::event::InputSlot;
use folio_core::geometry::{Bounds, RootMargin};
use folio_search::{QueryTicket, SearchHost};
use folio_toc::{HeadingSource, RawHeading, TocHost, VisibilityRecord};

/// Default height of one rendered heading.
pub const HEADING_HEIGHT: f64 = 32.0;
/// Height of one table-of-contents row.
pub const NAV_ROW_HEIGHT: f64 = 28.0;

/// One heading element in the simulated document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageHeading {
    pub rank: u8,
    pub id: Option<String>,
    pub text: String,
    /// Absolute document top in px.
    pub top: f64,
    pub height: f64,
}

#[derive(Debug)]
struct Observation {
    ids: Vec<String>,
    margin: RootMargin,
    intersecting: HashMap<String, bool>,
}

/// Work the components asked the page to start.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Requests {
    pub imports: Vec<String>,
    pub queries: Vec<(QueryTicket, String)>,
    pub resolves: Vec<(QueryTicket, String)>,
}

impl Requests {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.queries.is_empty() && self.resolves.is_empty()
    }
}

/// Simulated browser page.
#[derive(Debug)]
pub struct SimulatedPage {
    viewport_width: u32,
    viewport_height: f64,
    document_height: f64,
    scroll_y: f64,
    scroll_target: Option<f64>,
    article: Option<Vec<PageHeading>>,

    nav_viewport: Bounds,
    nav_scroll: f64,

    observer: Option<Observation>,
    batches: VecDeque<Vec<VisibilityRecord>>,

    overflow: String,
    overflow_log: Vec<String>,
    focused: Option<InputSlot>,
    focus_log: Vec<InputSlot>,
    requests: Requests,

    observe_count: usize,
    disconnect_count: usize,
    window_scrolls: Vec<f64>,
    nav_reveals: Vec<String>,
}

impl SimulatedPage {
    /// An empty article in a `width` x `height` viewport.
    #[must_use]
    pub fn new(width: u32, height: f64) -> Self {
        Self {
            viewport_width: width,
            viewport_height: height,
            document_height: height,
            scroll_y: 0.0,
            scroll_target: None,
            article: Some(Vec::new()),
            nav_viewport: Bounds::new(96.0, 96.0 + 6.0 * NAV_ROW_HEIGHT),
            nav_scroll: 0.0,
            observer: None,
            batches: VecDeque::new(),
            overflow: String::new(),
            overflow_log: Vec::new(),
            focused: None,
            focus_log: Vec::new(),
            requests: Requests::default(),
            observe_count: 0,
            disconnect_count: 0,
            window_scrolls: Vec::new(),
            nav_reveals: Vec::new(),
        }
    }

    /// The three-section article used throughout the end-to-end tests:
    /// Intro (h2) at 400px, Details (h2) at 1400px, Sub (h3) at 2400px,
    /// in a 1280x800 viewport over a 4000px document.
    #[must_use]
    pub fn three_sections() -> Self {
        Self::new(1280, 800.0)
            .with_heading(2, "intro", "Intro", 400.0)
            .with_heading(2, "details", "Details", 1_400.0)
            .with_heading(3, "sub", "Sub", 2_400.0)
            .with_document_height(4_000.0)
    }

    /// Append a heading with an anchor id.
    #[must_use]
    pub fn with_heading(self, rank: u8, id: &str, text: &str, top: f64) -> Self {
        self.with_raw_heading(PageHeading {
            rank,
            id: Some(id.to_owned()),
            text: text.to_owned(),
            top,
            height: HEADING_HEIGHT,
        })
    }

    /// Append an arbitrary heading element.
    #[must_use]
    pub fn with_raw_heading(mut self, heading: PageHeading) -> Self {
        let bottom = heading.top + heading.height;
        self.article.get_or_insert_with(Vec::new).push(heading);
        if bottom > self.document_height {
            self.document_height = bottom + self.viewport_height;
        }
        self
    }

    #[must_use]
    pub fn with_document_height(mut self, height: f64) -> Self {
        self.document_height = height.max(self.viewport_height);
        self
    }

    /// Remove the content container entirely.
    #[must_use]
    pub fn without_article(mut self) -> Self {
        self.article = None;
        self
    }

    #[must_use]
    pub fn with_body_overflow(mut self, value: &str) -> Self {
        self.overflow = value.to_owned();
        self
    }

    /// Place the table of contents' scroll container (viewport-relative).
    #[must_use]
    pub fn with_nav_viewport(mut self, bounds: Bounds) -> Self {
        self.nav_viewport = bounds;
        self
    }

    // --- Geometry ---

    #[must_use]
    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }

    fn clamp_scroll(&self, y: f64) -> f64 {
        y.clamp(0.0, self.max_scroll())
    }

    /// Absolute top of the heading with this id.
    #[must_use]
    pub fn absolute_top(&self, id: &str) -> Option<f64> {
        self.heading(id).map(|heading| heading.top)
    }

    fn heading(&self, id: &str) -> Option<&PageHeading> {
        self.article
            .as_ref()?
            .iter()
            .find(|heading| heading.id.as_deref() == Some(id))
    }

    /// Remove a heading from the document (e.g. re-rendered content).
    pub fn remove_heading(&mut self, id: &str) {
        if let Some(article) = self.article.as_mut() {
            article.retain(|heading| heading.id.as_deref() != Some(id));
        }
    }

    /// Resize the viewport. Observed state is re-evaluated.
    pub fn resize(&mut self, width: u32, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.scroll_y = self.clamp_scroll(self.scroll_y);
        self.sync_observer();
    }

    // --- Scrolling ---

    /// User scroll to an absolute position. Cancels any smooth scroll.
    pub fn user_scroll_to(&mut self, y: f64) {
        self.scroll_target = None;
        self.scroll_y = self.clamp_scroll(y);
        self.sync_observer();
    }

    /// User scroll by `dy` pixels.
    pub fn user_scroll_by(&mut self, dy: f64) {
        self.user_scroll_to(self.scroll_y + dy);
    }

    /// Whether a smooth scroll is in flight.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.scroll_target.is_some()
    }

    #[must_use]
    pub fn scroll_target(&self) -> Option<f64> {
        self.scroll_target
    }

    /// Advance a smooth scroll by at most `max_step` pixels. Returns whether
    /// the animation is still running afterwards.
    pub fn animate(&mut self, max_step: f64) -> bool {
        let Some(target) = self.scroll_target else {
            return false;
        };
        let delta = target - self.scroll_y;
        if delta.abs() <= max_step {
            self.scroll_y = target;
            self.scroll_target = None;
        } else {
            self.scroll_y += max_step.copysign(delta);
        }
        self.sync_observer();
        self.scroll_target.is_some()
    }

    /// Finish a smooth scroll immediately.
    pub fn settle(&mut self) {
        if let Some(target) = self.scroll_target.take() {
            self.scroll_y = target;
            self.sync_observer();
        }
    }

    // --- Observer ---

    /// Whether an observer is registered.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }

    /// Ids passed to the current observer.
    #[must_use]
    pub fn observed_ids(&self) -> Vec<String> {
        self.observer
            .as_ref()
            .map(|observer| observer.ids.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn observe_count(&self) -> usize {
        self.observe_count
    }

    #[must_use]
    pub fn disconnect_count(&self) -> usize {
        self.disconnect_count
    }

    /// Observer callbacks not yet delivered.
    pub fn take_batches(&mut self) -> Vec<Vec<VisibilityRecord>> {
        self.batches.drain(..).collect()
    }

    fn records(&self, observation: &Observation) -> Vec<(String, bool, f64)> {
        observation
            .ids
            .iter()
            .filter_map(|id| {
                let heading = self.heading(id)?;
                let top = heading.top - self.scroll_y;
                let bounds = Bounds::from_top_height(top, heading.height);
                let intersecting = observation.margin.intersects(&bounds, self.viewport_height);
                Some((id.clone(), intersecting, top))
            })
            .collect()
    }

    /// Queue a batch with every observed heading whose state changed.
    fn sync_observer(&mut self) {
        let Some(observation) = self.observer.as_ref() else {
            return;
        };
        let records = self.records(observation);
        let Some(observation) = self.observer.as_mut() else {
            return;
        };
        let mut batch = Vec::new();
        for (id, intersecting, top) in records {
            let changed = observation.intersecting.get(&id) != Some(&intersecting);
            if changed {
                observation.intersecting.insert(id.clone(), intersecting);
                batch.push(VisibilityRecord::new(id, intersecting, top));
            }
        }
        if !batch.is_empty() {
            self.batches.push_back(batch);
        }
    }

    // --- Table of contents ---

    /// Current scroll offset of the nav container.
    #[must_use]
    pub fn nav_scroll(&self) -> f64 {
        self.nav_scroll
    }

    /// Ids revealed in the nav, in order.
    #[must_use]
    pub fn nav_reveals(&self) -> &[String] {
        &self.nav_reveals
    }

    /// Every `scroll_window_to` target, in order.
    #[must_use]
    pub fn window_scrolls(&self) -> &[f64] {
        &self.window_scrolls
    }

    // --- Search ---

    #[must_use]
    pub fn body_overflow_value(&self) -> &str {
        &self.overflow
    }

    /// Every value written to the body overflow, in order.
    #[must_use]
    pub fn overflow_log(&self) -> &[String] {
        &self.overflow_log
    }

    #[must_use]
    pub fn focused(&self) -> Option<InputSlot> {
        self.focused
    }

    #[must_use]
    pub fn focus_log(&self) -> &[InputSlot] {
        &self.focus_log
    }

    /// The user moved focus elsewhere.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Requests started since the last call.
    pub fn take_requests(&mut self) -> Requests {
        std::mem::take(&mut self.requests)
    }

    /// Requests not yet taken.
    #[must_use]
    pub fn requests(&self) -> &Requests {
        &self.requests
    }
}

impl HeadingSource for SimulatedPage {
    fn raw_headings(&self) -> Option<Vec<RawHeading>> {
        let article = self.article.as_ref()?;
        Some(
            article
                .iter()
                .map(|heading| RawHeading {
                    rank: heading.rank,
                    id: heading.id.clone(),
                    text: heading.text.clone(),
                })
                .collect(),
        )
    }
}

impl TocHost for SimulatedPage {
    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn heading_top(&self, id: &str) -> Option<f64> {
        self.heading(id).map(|heading| heading.top - self.scroll_y)
    }

    fn nav_link_bounds(&self, id: &str) -> Option<Bounds> {
        let observer = self.observer.as_ref()?;
        let row = observer.ids.iter().position(|observed| observed == id)?;
        let top = self.nav_viewport.top + row as f64 * NAV_ROW_HEIGHT - self.nav_scroll;
        Some(Bounds::from_top_height(top, NAV_ROW_HEIGHT))
    }

    fn nav_viewport_bounds(&self) -> Option<Bounds> {
        Some(self.nav_viewport)
    }

    fn observe_headings(&mut self, ids: &[String], margin: RootMargin) {
        self.observe_count += 1;
        self.observer = Some(Observation {
            ids: ids.to_vec(),
            margin,
            intersecting: HashMap::new(),
        });
        // Observers report every target once on registration.
        if let Some(observation) = self.observer.as_ref() {
            let records = self.records(observation);
            let batch: Vec<VisibilityRecord> = records
                .iter()
                .map(|(id, intersecting, top)| VisibilityRecord::new(id.clone(), *intersecting, *top))
                .collect();
            if let Some(observation) = self.observer.as_mut() {
                for (id, intersecting, _) in records {
                    observation.intersecting.insert(id, intersecting);
                }
            }
            if !batch.is_empty() {
                self.batches.push_back(batch);
            }
        }
    }

    fn disconnect_observer(&mut self) {
        if self.observer.take().is_some() {
            self.disconnect_count += 1;
        }
        self.batches.clear();
    }

    fn scroll_window_to(&mut self, top: f64) {
        self.window_scrolls.push(top);
        self.scroll_target = Some(self.clamp_scroll(top));
    }

    fn scroll_nav_link_into_view(&mut self, id: &str) {
        let Some(link) = self.nav_link_bounds(id) else {
            return;
        };
        self.nav_reveals.push(id.to_owned());
        if link.top < self.nav_viewport.top {
            self.nav_scroll -= self.nav_viewport.top - link.top;
        } else if link.bottom > self.nav_viewport.bottom {
            self.nav_scroll += link.bottom - self.nav_viewport.bottom;
        }
        self.nav_scroll = self.nav_scroll.max(0.0);
    }
}

impl SearchHost for SimulatedPage {
    fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    fn focus_input(&mut self, slot: InputSlot) {
        self.focused = Some(slot);
        self.focus_log.push(slot);
    }

    fn body_overflow(&self) -> String {
        self.overflow.clone()
    }

    fn set_body_overflow(&mut self, value: &str) {
        self.overflow = value.to_owned();
        self.overflow_log.push(value.to_owned());
    }

    fn import_index(&mut self, path: &str) {
        self.requests.imports.push(path.to_owned());
    }

    fn run_query(&mut self, ticket: QueryTicket, query: &str) {
        self.requests.queries.push((ticket, query.to_owned()));
    }

    fn resolve_result(&mut self, ticket: QueryTicket, id: &str) {
        self.requests.resolves.push((ticket, id.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observer_reports_all_targets_then_changes_only() {
        let mut page = SimulatedPage::three_sections();
        let ids: Vec<String> = ["intro", "details", "sub"].map(String::from).to_vec();
        page.observe_headings(&ids, RootMargin::default());
        let initial = page.take_batches();
        assert_eq!(initial.len(), 1);
        assert_eq!(initial[0].len(), 3);
        // Band is [80, 320) at 800px; intro at 400 is below it.
        assert!(initial[0].iter().all(|record| !record.is_intersecting));

        page.user_scroll_to(200.0);
        let batches = page.take_batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], vec![VisibilityRecord::new("intro", true, 200.0)]);

        page.user_scroll_by(1.0);
        assert!(page.take_batches().is_empty());
    }

    #[test]
    fn smooth_scroll_is_clamped_and_animated() {
        let mut page = SimulatedPage::three_sections();
        page.scroll_window_to(10_000.0);
        assert_eq!(page.scroll_target(), Some(3_200.0));
        assert!(page.animate(1_000.0));
        assert_eq!(page.scroll_y(), 1_000.0);
        page.settle();
        assert_eq!(page.scroll_y(), 3_200.0);
        assert!(!page.is_animating());
    }

    #[test]
    fn user_scroll_cancels_animation() {
        let mut page = SimulatedPage::three_sections();
        page.scroll_window_to(2_000.0);
        page.user_scroll_by(50.0);
        assert!(!page.is_animating());
        assert_eq!(page.scroll_y(), 50.0);
    }

    #[test]
    fn nav_reveal_scrolls_minimally() {
        let mut page = SimulatedPage::new(1280, 800.0)
            .with_nav_viewport(Bounds::new(100.0, 100.0 + 2.0 * NAV_ROW_HEIGHT));
        for i in 0..5 {
            page = page.with_heading(2, &format!("h{i}"), "H", 500.0 * (i + 1) as f64);
        }
        let ids: Vec<String> = (0..5).map(|i| format!("h{i}")).collect();
        page.observe_headings(&ids, RootMargin::default());

        page.scroll_nav_link_into_view("h3");
        assert_eq!(page.nav_scroll(), 2.0 * NAV_ROW_HEIGHT);
        let link = page.nav_link_bounds("h3").unwrap();
        assert_eq!(link.bottom, 100.0 + 2.0 * NAV_ROW_HEIGHT);

        page.scroll_nav_link_into_view("h0");
        assert_eq!(page.nav_scroll(), 0.0);
    }

    #[test]
    fn disconnect_drops_undelivered_batches() {
        let mut page = SimulatedPage::three_sections();
        page.observe_headings(&["intro".to_owned()], RootMargin::default());
        page.disconnect_observer();
        assert!(page.take_batches().is_empty());
        assert_eq!(page.disconnect_count(), 1);
        page.disconnect_observer();
        assert_eq!(page.disconnect_count(), 1);
    }
}
