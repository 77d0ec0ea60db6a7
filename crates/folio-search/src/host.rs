#![forbid(unsafe_code)]

use folio_core::event::InputSlot;

use crate::executor::QueryTicket;

/// The search overlay's view of the page.
///
/// Asynchronous work (`import_index`, `run_query`, `resolve_result`) only
/// starts here; its outcome is delivered back through
/// [`IndexLoader::complete`](crate::IndexLoader::complete),
/// [`SearchOverlay::on_query_complete`](crate::SearchOverlay::on_query_complete)
/// and [`SearchOverlay::on_result_resolved`](crate::SearchOverlay::on_result_resolved).
pub trait SearchHost {
    /// Current viewport width in CSS pixels.
    fn viewport_width(&self) -> u32;

    /// Focus the input and select its text.
    fn focus_input(&mut self, slot: InputSlot);

    /// Current inline `overflow` style of the document body.
    fn body_overflow(&self) -> String;

    fn set_body_overflow(&mut self, value: &str);

    /// Start importing the index module from `path`.
    fn import_index(&mut self, path: &str);

    /// Start a lookup.
    fn run_query(&mut self, ticket: QueryTicket, query: &str);

    /// Start resolving one result's payload.
    fn resolve_result(&mut self, ticket: QueryTicket, id: &str);
}
