#![forbid(unsafe_code)]

//! `web-sys` implementation of the host traits.
//!
//! Page markup contract:
//!
//! - the article body is the first `<article>`
//! - the table of contents renders into `[data-folio-toc]`, which is also
//!   the nav's scroll container
//! - search inputs carry `data-search-input="desktop"` or `"mobile"`
//! - the result panel is `[data-search-panel]`, the scrim
//!   `[data-search-scrim]`, the mobile button `[data-search-toggle]`
//!
//! Asynchronous work (index import, queries, result payloads, observer
//! callbacks) posts a [`Message`] to the shared [`Inbox`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use folio_core::event::InputSlot;
use folio_core::geometry::{Bounds, RootMargin};
use folio_runtime::CancelToken;
use folio_search::{IndexError, QueryTicket, ResultData, ResultHandle, SearchHost};
use folio_toc::{HeadingSource, RawHeading, TocHost, VisibilityRecord};
use js_sys::{Array, Function, JSON, Promise, Reflect};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, Element, HtmlElement, HtmlInputElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, ScrollToOptions, Window,
};

use crate::cache::ResultCache;
use crate::error::WebError;
use crate::step_program::Message;

pub(crate) const ARTICLE: &str = "article";
const HEADINGS: &str = "h2, h3";
const ANCHOR_DECORATION: &str = ".anchor, .anchor-icon";
pub(crate) const TOC_CONTAINER: &str = "[data-folio-toc]";
const TOC_LINK: &str = "a.toc-link";
pub(crate) const SEARCH_INPUT_ATTR: &str = "data-search-input";
pub(crate) const SEARCH_PANEL: &str = "[data-search-panel]";
pub(crate) const SEARCH_SCRIM: &str = "[data-search-scrim]";
pub(crate) const SEARCH_TOGGLE: &str = "[data-search-toggle]";
pub(crate) const RESULT_ID_ATTR: &str = "data-result-id";

#[wasm_bindgen(inline_js = "export function folio_import(path) { return import(path); }")]
extern "C" {
    #[wasm_bindgen(js_name = folio_import)]
    fn import_module(path: &str) -> Promise;
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        Self::Js(js_message(&value))
    }
}

pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}

pub(crate) fn query(root: &Document, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

fn bounds(element: &Element) -> Bounds {
    let rect = element.get_bounding_client_rect();
    Bounds::new(rect.top(), rect.bottom())
}

/// Messages posted by callbacks, plus an optional waker run after each post.
#[derive(Clone, Default)]
pub struct Inbox {
    queue: Rc<RefCell<VecDeque<Message>>>,
    waker: Rc<RefCell<Option<Rc<dyn Fn()>>>>,
}

impl Inbox {
    /// Queue a message without waking.
    pub fn enqueue(&self, message: Message) {
        self.queue.borrow_mut().push_back(message);
    }

    /// Queue a message and run the waker.
    pub fn post(&self, message: Message) {
        self.enqueue(message);
        let waker = self.waker.borrow().clone();
        if let Some(wake) = waker {
            wake();
        }
    }

    pub fn drain(&self) -> Vec<Message> {
        self.queue.borrow_mut().drain(..).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    pub fn set_waker(&self, waker: Option<Rc<dyn Fn()>>) {
        *self.waker.borrow_mut() = waker;
    }
}

/// Payload of one search result as the index module returns it.
#[derive(Debug, Deserialize)]
struct RawResultData {
    url: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    meta: Option<RawMeta>,
}

#[derive(Debug, Deserialize)]
struct RawMeta {
    #[serde(default)]
    title: Option<String>,
}

impl From<RawResultData> for ResultData {
    fn from(raw: RawResultData) -> Self {
        Self {
            url: raw.url,
            title: raw.title,
            meta_title: raw.meta.and_then(|meta| meta.title),
            excerpt_html: raw.excerpt,
        }
    }
}

/// Observer plus the callback it holds a reference to.
struct Observer {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array)>,
}

/// The live document as seen by both components.
pub struct DomHost {
    window: Window,
    document: Document,
    inbox: Inbox,
    observer: Option<Observer>,
    index: Rc<RefCell<Option<JsValue>>>,
    results: Rc<RefCell<ResultCache<JsValue>>>,
    lifetime: CancelToken,
}

impl DomHost {
    /// Host for the current document, keeping at most `max_results` result
    /// objects per query.
    pub fn new(inbox: Inbox, max_results: usize) -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::MissingWindow)?;
        let document = window
            .document()
            .ok_or_else(|| WebError::Js("window has no document".into()))?;
        Ok(Self {
            window,
            document,
            inbox,
            observer: None,
            index: Rc::new(RefCell::new(None)),
            results: Rc::new(RefCell::new(ResultCache::new(max_results))),
            lifetime: CancelToken::new(),
        })
    }

    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Completions of queries started before `lifetime` is cancelled are
    /// dropped instead of posted.
    pub fn set_lifetime(&mut self, lifetime: CancelToken) {
        self.lifetime = lifetime;
    }

    /// Forget result objects of the previous page view.
    pub fn reset(&mut self) {
        self.results.borrow_mut().clear();
    }

    fn nav_link(&self, id: &str) -> Option<Element> {
        let container = query(&self.document, TOC_CONTAINER)?;
        let links = container.query_selector_all(TOC_LINK).ok()?;
        let href = format!("#{id}");
        (0..links.length())
            .filter_map(|i| links.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .find(|link| link.get_attribute("href").as_deref() == Some(href.as_str()))
    }

    fn input(&self, slot: InputSlot) -> Option<HtmlInputElement> {
        let value = match slot {
            InputSlot::Desktop => "desktop",
            InputSlot::Mobile => "mobile",
        };
        query(&self.document, &format!("[{SEARCH_INPUT_ATTR}=\"{value}\"]"))
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
    }

    fn body(&self) -> Option<HtmlElement> {
        self.document.body()
    }
}

impl HeadingSource for DomHost {
    fn raw_headings(&self) -> Option<Vec<RawHeading>> {
        let article = query(&self.document, ARTICLE)?;
        let nodes = article.query_selector_all(HEADINGS).ok()?;
        let mut headings = Vec::with_capacity(nodes.length() as usize);
        for i in 0..nodes.length() {
            let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let rank = match element.tag_name().to_ascii_lowercase().as_str() {
                "h2" => 2,
                "h3" => 3,
                _ => continue,
            };
            let id = element.id();
            headings.push(RawHeading {
                rank,
                id: (!id.is_empty()).then_some(id),
                text: visible_text(&element),
            });
        }
        Some(headings)
    }
}

/// Text content without anchor decorations.
fn visible_text(element: &Element) -> String {
    let copy = element
        .clone_node_with_deep(true)
        .ok()
        .and_then(|node| node.dyn_into::<Element>().ok());
    let Some(copy) = copy else {
        return element.text_content().unwrap_or_default();
    };
    if let Ok(decorations) = copy.query_selector_all(ANCHOR_DECORATION) {
        for i in 0..decorations.length() {
            if let Some(decoration) = decorations.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                decoration.remove();
            }
        }
    }
    copy.text_content().unwrap_or_default()
}

impl TocHost for DomHost {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn heading_top(&self, id: &str) -> Option<f64> {
        self.document
            .get_element_by_id(id)
            .map(|element| element.get_bounding_client_rect().top())
    }

    fn nav_link_bounds(&self, id: &str) -> Option<Bounds> {
        self.nav_link(id).as_ref().map(bounds)
    }

    fn nav_viewport_bounds(&self) -> Option<Bounds> {
        query(&self.document, TOC_CONTAINER).as_ref().map(bounds)
    }

    fn observe_headings(&mut self, ids: &[String], margin: RootMargin) {
        self.disconnect_observer();
        let inbox = self.inbox.clone();
        let callback = Closure::<dyn FnMut(Array)>::new(move |entries: Array| {
            let batch: Vec<VisibilityRecord> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| {
                    VisibilityRecord::new(
                        entry.target().id(),
                        entry.is_intersecting(),
                        entry.bounding_client_rect().top(),
                    )
                })
                .collect();
            inbox.post(Message::Visibility(batch));
        });
        let options = IntersectionObserverInit::new();
        options.set_root_margin(&margin.to_css());
        let observer =
            match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) {
                Ok(observer) => observer,
                Err(err) => {
                    tracing::error!(error = %js_message(&err), "failed to create intersection observer");
                    return;
                }
            };
        for id in ids {
            if let Some(element) = self.document.get_element_by_id(id) {
                observer.observe(&element);
            }
        }
        tracing::debug!(count = ids.len(), margin = %margin.to_css(), "observing headings");
        self.observer = Some(Observer {
            observer,
            _callback: callback,
        });
    }

    fn disconnect_observer(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.observer.disconnect();
        }
    }

    fn scroll_window_to(&mut self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn scroll_nav_link_into_view(&mut self, id: &str) {
        if let Some(link) = self.nav_link(id) {
            let options = ScrollIntoViewOptions::new();
            options.set_block(ScrollLogicalPosition::Nearest);
            options.set_behavior(ScrollBehavior::Smooth);
            link.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }
}

impl SearchHost for DomHost {
    fn viewport_width(&self) -> u32 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .map_or(0, |width| width.max(0.0) as u32)
    }

    fn focus_input(&mut self, slot: InputSlot) {
        if let Some(input) = self.input(slot) {
            let _ = input.focus();
            input.select();
        }
    }

    fn body_overflow(&self) -> String {
        self.body()
            .and_then(|body| body.style().get_property_value("overflow").ok())
            .unwrap_or_default()
    }

    fn set_body_overflow(&mut self, value: &str) {
        let Some(body) = self.body() else {
            return;
        };
        let style = body.style();
        let result = if value.is_empty() {
            style.remove_property("overflow").map(drop)
        } else {
            style.set_property("overflow", value)
        };
        if let Err(err) = result {
            tracing::warn!(error = %js_message(&err), "failed to set body overflow");
        }
    }

    fn import_index(&mut self, path: &str) {
        let inbox = self.inbox.clone();
        let index = Rc::clone(&self.index);
        let path = path.to_owned();
        spawn_local(async move {
            let result = match JsFuture::from(import_module(&path)).await {
                Ok(module) => {
                    *index.borrow_mut() = Some(module);
                    Ok(())
                }
                Err(err) => Err(IndexError::Load {
                    path,
                    message: js_message(&err),
                }),
            };
            inbox.post(Message::IndexLoaded(result));
        });
    }

    fn run_query(&mut self, ticket: QueryTicket, query: &str) {
        let inbox = self.inbox.clone();
        self.results.borrow_mut().begin(ticket);
        let results = Rc::clone(&self.results);
        let lifetime = self.lifetime.clone();
        let module = self.index.borrow().clone();
        let query = query.to_owned();
        spawn_local(async move {
            let result = match module {
                Some(module) => search(&module, &query).await,
                None => Err(IndexError::Query("index module not loaded".into())),
            };
            if lifetime.is_cancelled() {
                return;
            }
            let result = result.map(|found| {
                let ids = results.borrow_mut().store(ticket, found);
                ids.into_iter().map(ResultHandle::new).collect()
            });
            inbox.post(Message::QueryComplete { ticket, result });
        });
    }

    fn resolve_result(&mut self, ticket: QueryTicket, id: &str) {
        let inbox = self.inbox.clone();
        let lifetime = self.lifetime.clone();
        let object = self.results.borrow().get(id).cloned();
        let id = id.to_owned();
        spawn_local(async move {
            let result = match object {
                Some(object) => resolve(&object, &id).await,
                None => Err(IndexError::Resolve {
                    id: id.clone(),
                    message: "unknown result".into(),
                }),
            };
            if lifetime.is_cancelled() {
                return;
            }
            inbox.post(Message::ResultResolved { ticket, id, result });
        });
    }
}

/// `module.search(query)`, returning `(id, result object)` pairs in rank order.
async fn search(module: &JsValue, query: &str) -> Result<Vec<(String, JsValue)>, IndexError> {
    let query_error = |err: JsValue| IndexError::Query(js_message(&err));
    let search = Reflect::get(module, &JsValue::from_str("search"))
        .and_then(|value| value.dyn_into::<Function>())
        .map_err(query_error)?;
    let promise = search
        .call1(module, &JsValue::from_str(query))
        .and_then(|value| value.dyn_into::<Promise>())
        .map_err(query_error)?;
    let response = JsFuture::from(promise).await.map_err(query_error)?;
    let list = Reflect::get(&response, &JsValue::from_str("results"))
        .and_then(|value| value.dyn_into::<Array>())
        .map_err(query_error)?;
    Ok(list
        .iter()
        .filter_map(|item| {
            let id = Reflect::get(&item, &JsValue::from_str("id"))
                .ok()
                .and_then(|id| id.as_string())?;
            Some((id, item))
        })
        .collect())
}

/// `result.data()`, decoded through JSON.
async fn resolve(object: &JsValue, id: &str) -> Result<ResultData, IndexError> {
    let resolve_error = |err: JsValue| IndexError::Resolve {
        id: id.to_owned(),
        message: js_message(&err),
    };
    let data = Reflect::get(object, &JsValue::from_str("data"))
        .and_then(|value| value.dyn_into::<Function>())
        .map_err(resolve_error)?;
    let promise = data
        .call0(object)
        .and_then(|value| value.dyn_into::<Promise>())
        .map_err(resolve_error)?;
    let value = JsFuture::from(promise).await.map_err(resolve_error)?;
    let json = JSON::stringify(&value).map_err(resolve_error)?;
    let raw: RawResultData =
        serde_json::from_str(&String::from(json)).map_err(|err| IndexError::Resolve {
            id: id.to_owned(),
            message: err.to_string(),
        })?;
    Ok(raw.into())
}
