#![forbid(unsafe_code)]

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use core::time::Duration;

use folio_core::event::{Event, EventDisposition, InputSlot, KeyEvent, Target};
use folio_runtime::{Clock, SystemClock, TeardownScope};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, EventTarget, HtmlInputElement, KeyboardEvent,
    Window,
};

use crate::config::FolioConfig;
use crate::dom::{
    self, DomHost, Inbox, RESULT_ID_ATTR, SEARCH_INPUT_ATTR, SEARCH_PANEL, SEARCH_SCRIM,
    SEARCH_TOGGLE, TOC_CONTAINER,
};
use crate::error::WebError;
use crate::cache::FragmentCache;
use crate::step_program::{Message, StepProgram};

struct Shared {
    program: RefCell<StepProgram<DomHost>>,
    inbox: Inbox,
    clock: SystemClock,
    window: Window,
    document: Document,
    rendered_toc: RefCell<FragmentCache>,
    rendered_panel: RefCell<FragmentCache>,
    timeout: Cell<Option<i32>>,
}

/// The page components mounted on the live document.
///
/// Construct once per page, call `pageLoad()` after every client-side
/// navigation, and `destroy()` when the page is discarded.
#[wasm_bindgen]
pub struct FolioWeb {
    shared: Rc<Shared>,
    listeners: TeardownScope,
}

#[wasm_bindgen]
impl FolioWeb {
    /// Mount on the current document. `config` is an optional JSON object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<FolioWeb, JsValue> {
        Self::mount(config.as_deref()).map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Re-collect headings and reset search after a navigation.
    ///
    /// Runs automatically on the configured `navigation_event`; hosts
    /// without one call it themselves.
    #[wasm_bindgen(js_name = pageLoad)]
    pub fn page_load(&mut self) {
        reload(&self.shared);
    }

    /// Apply pending callbacks and due timers now.
    pub fn step(&self) {
        pump(&self.shared);
    }

    /// Anchor id of the active heading.
    #[wasm_bindgen(js_name = activeHeading)]
    pub fn active_heading(&self) -> Option<String> {
        let program = self.shared.program.try_borrow().ok()?;
        program.tracker().active_id().map(str::to_owned)
    }

    /// Detach listeners and observers, cancel timers, restore the body.
    pub fn destroy(&mut self) {
        self.release();
    }
}

impl Drop for FolioWeb {
    fn drop(&mut self) {
        self.release();
    }
}

impl FolioWeb {
    fn release(&mut self) {
        self.listeners.close();
        self.shared.inbox.set_waker(None);
        if let Some(handle) = self.shared.timeout.take() {
            self.shared.window.clear_timeout_with_handle(handle);
        }
        if let Ok(mut program) = self.shared.program.try_borrow_mut() {
            program.shutdown();
        }
        self.shared.inbox.drain();
    }

    fn mount(config: Option<&str>) -> Result<Self, WebError> {
        let config = match config {
            Some(json) => FolioConfig::from_json(json)?,
            None => FolioConfig::default(),
        };
        let navigation_event = config.navigation_event.clone();
        let inbox = Inbox::default();
        let host = DomHost::new(inbox.clone(), config.search.max_results)?;
        let window = host.window().clone();
        let document = host.document().clone();
        let shared = Rc::new(Shared {
            program: RefCell::new(StepProgram::new(config, host)),
            inbox,
            clock: SystemClock::new(),
            window,
            document,
            rendered_toc: RefCell::new(FragmentCache::new()),
            rendered_panel: RefCell::new(FragmentCache::new()),
            timeout: Cell::new(None),
        });

        let weak = Rc::downgrade(&shared);
        shared.inbox.set_waker(Some(Rc::new(move || {
            if let Some(shared) = weak.upgrade() {
                pump(&shared);
            }
        })));

        let ((), listeners) =
            TeardownScope::build(|scope| attach(scope, &shared, &navigation_event))?;
        let web = Self { shared, listeners };
        reload(&web.shared);
        tracing::info!("folio mounted");
        Ok(web)
    }
}

fn reload(shared: &Rc<Shared>) {
    if let Ok(mut program) = shared.program.try_borrow_mut() {
        program.set_time(shared.clock.now_mono());
        program.host_mut().reset();
        program.page_load();
        let lifetime = program.overlay().lifetime();
        program.host_mut().set_lifetime(lifetime);
    }
    pump(shared);
}

/// Feed the inbox to the program until it stays empty, then render and
/// schedule the next deadline. Re-entrant calls return immediately; the
/// outer call picks up whatever they queued.
fn pump(shared: &Rc<Shared>) -> EventDisposition {
    let Ok(mut program) = shared.program.try_borrow_mut() else {
        return EventDisposition::Ignored;
    };
    let mut disposition = EventDisposition::Ignored;
    loop {
        for message in shared.inbox.drain() {
            program.push(message);
        }
        program.set_time(shared.clock.now_mono());
        disposition = disposition.merge(program.step().disposition);
        if shared.inbox.is_empty() {
            break;
        }
    }
    render(shared, &program);
    let delay = program
        .next_deadline()
        .map(|deadline| deadline.saturating_sub(program.now()));
    drop(program);
    schedule(shared, delay);
    disposition
}

fn render(shared: &Shared, program: &StepProgram<DomHost>) {
    let toc = program.toc_view().map(|view| view.to_html()).unwrap_or_default();
    if let Some(container) = dom::query(&shared.document, TOC_CONTAINER) {
        if let Some(html) = shared.rendered_toc.borrow_mut().update(toc) {
            container.set_inner_html(html);
        }
    }

    let panel = program.panel_view();
    if let Some(element) = dom::query(&shared.document, SEARCH_PANEL) {
        if let Some(html) = shared.rendered_panel.borrow_mut().update(panel.to_html()) {
            element.set_inner_html(html);
        }
        let _ = element.toggle_attribute_with_force("hidden", !panel.visible);
    }
    if let Some(element) = dom::query(&shared.document, SEARCH_SCRIM) {
        let _ = element.toggle_attribute_with_force("hidden", !panel.scrim);
    }
}

fn schedule(shared: &Rc<Shared>, delay: Option<Duration>) {
    if let Some(handle) = shared.timeout.take() {
        shared.window.clear_timeout_with_handle(handle);
    }
    let Some(delay) = delay else {
        return;
    };
    let weak = Rc::downgrade(shared);
    // Freed after it runs; a cleared timeout leaks its callback.
    let callback = Closure::once_into_js(move || {
        if let Some(shared) = weak.upgrade() {
            shared.timeout.set(None);
            pump(&shared);
        }
    });
    let millis = i32::try_from(delay.as_micros().div_ceil(1_000)).unwrap_or(i32::MAX);
    match shared
        .window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
    {
        Ok(handle) => shared.timeout.set(Some(handle)),
        Err(err) => tracing::warn!(error = %dom::js_message(&err), "failed to schedule step"),
    }
}

/// Queue `event` and pump; cancel the native event when a component
/// consumed it.
fn dispatch(weak: &Weak<Shared>, native: &web_sys::Event, event: Event) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    shared.inbox.enqueue(Message::Event(event));
    if pump(&shared).is_consumed() {
        native.prevent_default();
        native.stop_propagation();
    }
}

fn listen(
    scope: &mut TeardownScope,
    target: &EventTarget,
    kind: &'static str,
    passive: bool,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), WebError> {
    listen_as(scope, kind, target, kind, passive, handler)
}

/// Like [`listen`] for an event name only known at runtime.
fn listen_as(
    scope: &mut TeardownScope,
    label: &'static str,
    target: &EventTarget,
    kind: &str,
    passive: bool,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), WebError> {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    let target = target.clone();
    let kind = kind.to_owned();
    scope.defer(label, move || {
        let _ = target.remove_event_listener_with_callback(&kind, closure.as_ref().unchecked_ref());
        drop(closure);
    });
    Ok(())
}

fn target_element(event: &web_sys::Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn closest(event: &web_sys::Event, selector: &str) -> Option<Element> {
    target_element(event)?.closest(selector).ok().flatten()
}

fn input_slot(element: &Element) -> Option<InputSlot> {
    match element.get_attribute(SEARCH_INPUT_ATTR)?.as_str() {
        "mobile" => Some(InputSlot::Mobile),
        _ => Some(InputSlot::Desktop),
    }
}

/// Translate a click into a component target.
fn click_target(event: &web_sys::Event) -> Option<Target> {
    if let Some(link) = closest(event, "a.toc-link") {
        let href = link.get_attribute("href")?;
        return Some(Target::NavLink(href.trim_start_matches('#').to_owned()));
    }
    if closest(event, SEARCH_TOGGLE).is_some() {
        return Some(Target::MobileToggle);
    }
    let result = closest(event, &format!("[{RESULT_ID_ATTR}]"))?;
    result.get_attribute(RESULT_ID_ATTR).map(Target::SearchResult)
}

fn attach(
    scope: &mut TeardownScope,
    shared: &Rc<Shared>,
    navigation_event: &str,
) -> Result<(), WebError> {
    let document: &EventTarget = shared.document.as_ref();
    let window: &EventTarget = shared.window.as_ref();
    let input_selector = format!("[{SEARCH_INPUT_ATTR}]");

    let weak = Rc::downgrade(shared);
    listen(scope, document, "keydown", false, move |native| {
        if let Some(key) = native.dyn_ref::<KeyboardEvent>() {
            let event = KeyEvent::from_dom(
                &key.key(),
                key.ctrl_key(),
                key.meta_key(),
                key.alt_key(),
                key.shift_key(),
            );
            dispatch(&weak, &native, Event::Key(event));
        }
    })?;

    let weak = Rc::downgrade(shared);
    listen(scope, window, "wheel", true, move |native| {
        dispatch(&weak, &native, Event::Wheel);
    })?;

    let weak = Rc::downgrade(shared);
    listen(scope, window, "touchstart", true, move |native| {
        dispatch(&weak, &native, Event::TouchStart);
    })?;

    let weak = Rc::downgrade(shared);
    listen(scope, document, "click", false, move |native| {
        if let Some(target) = click_target(&native) {
            dispatch(&weak, &native, Event::Click(target));
        }
    })?;

    let weak = Rc::downgrade(shared);
    listen(scope, document, "pointerdown", false, move |native| {
        if closest(&native, SEARCH_SCRIM).is_some() {
            dispatch(&weak, &native, Event::PointerDown(Target::Scrim));
        }
    })?;

    let weak = Rc::downgrade(shared);
    let selector = input_selector.clone();
    listen(scope, document, "focusin", false, move |native| {
        let slot = closest(&native, &selector).and_then(|input| input_slot(&input));
        if let Some(slot) = slot {
            dispatch(&weak, &native, Event::Focus(Target::SearchInput(slot)));
        }
    })?;

    let weak = Rc::downgrade(shared);
    listen(scope, document, "input", false, move |native| {
        let Some(element) = closest(&native, &input_selector) else {
            return;
        };
        let Some(slot) = input_slot(&element) else {
            return;
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            let event = Event::Input {
                target: Target::SearchInput(slot),
                value: input.value(),
            };
            dispatch(&weak, &native, event);
        }
    })?;

    let weak = Rc::downgrade(shared);
    listen(scope, window, "resize", true, move |native| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let size = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).map_or(0, |v| v.max(0.0) as u32)
        };
        let event = Event::Resize {
            width: size(shared.window.inner_width()),
            height: size(shared.window.inner_height()),
        };
        dispatch(&weak, &native, event);
    })?;

    if !navigation_event.is_empty() {
        let weak = Rc::downgrade(shared);
        listen_as(scope, "navigation", document, navigation_event, true, move |_| {
            if let Some(shared) = weak.upgrade() {
                reload(&shared);
            }
        })?;
    }

    tracing::debug!(listeners = scope.len(), "listeners attached");
    Ok(())
}
