#![forbid(unsafe_code)]

//! Small caches used by the DOM host.
//!
//! [`ResultCache`] keeps the backend objects of the latest query so result
//! payloads can be resolved later. [`FragmentCache`] remembers the last HTML
//! written to an element so unchanged views are not written again.

use std::collections::HashMap;

use folio_search::QueryTicket;

/// Backend result objects of the most recent query, at most `cap` of them.
#[derive(Debug)]
pub struct ResultCache<T> {
    ticket: Option<QueryTicket>,
    by_id: HashMap<String, T>,
    cap: usize,
}

impl<T> ResultCache<T> {
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            ticket: None,
            by_id: HashMap::new(),
            cap,
        }
    }

    /// A query was issued; objects of earlier queries are dropped.
    pub fn begin(&mut self, ticket: QueryTicket) {
        self.ticket = Some(ticket);
        self.by_id.clear();
    }

    /// Keep the first `cap` results of `ticket`, returning their ids in rank
    /// order. Results of any other ticket are discarded.
    pub fn store(&mut self, ticket: QueryTicket, found: Vec<(String, T)>) -> Vec<String> {
        if self.ticket != Some(ticket) {
            tracing::trace!(?ticket, "dropping results of a superseded query");
            return Vec::new();
        }
        found
            .into_iter()
            .take(self.cap)
            .map(|(id, object)| {
                self.by_id.insert(id.clone(), object);
                id
            })
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Forget everything, including the current ticket.
    pub fn clear(&mut self) {
        self.ticket = None;
        self.by_id.clear();
    }
}

/// Last HTML written to one element.
#[derive(Debug, Default)]
pub struct FragmentCache {
    html: Option<String>,
}

impl FragmentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `html`, returning it when it differs from what was written last.
    pub fn update(&mut self, html: String) -> Option<&str> {
        if self.html.as_deref() == Some(html.as_str()) {
            return None;
        }
        self.html = Some(html);
        self.html.as_deref()
    }
}
