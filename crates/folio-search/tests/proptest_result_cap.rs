#![forbid(unsafe_code)]

//! Property tests for query completion.
//!
//! 1. Results never exceed `max_results` and keep index order.
//! 2. Only the last issued ticket can change the results.

use std::time::Duration;

use folio_core::event::InputSlot;
use folio_search::{
    IndexLoader, QueryTicket, ResultHandle, SearchConfig, SearchHost, SearchOverlay,
};
use proptest::prelude::*;

#[derive(Default)]
struct Sink {
    tickets: Vec<QueryTicket>,
    resolves: usize,
}

impl SearchHost for Sink {
    fn viewport_width(&self) -> u32 {
        1024
    }
    fn focus_input(&mut self, _slot: InputSlot) {}
    fn body_overflow(&self) -> String {
        String::new()
    }
    fn set_body_overflow(&mut self, _value: &str) {}
    fn import_index(&mut self, _path: &str) {}
    fn run_query(&mut self, ticket: QueryTicket, _query: &str) {
        self.tickets.push(ticket);
    }
    fn resolve_result(&mut self, _ticket: QueryTicket, _id: &str) {
        self.resolves += 1;
    }
}

fn overlay(max_results: usize) -> SearchOverlay {
    let loader = IndexLoader::new();
    loader.request();
    loader.complete(Ok(()));
    SearchOverlay::new(
        SearchConfig {
            max_results,
            ..SearchConfig::default()
        },
        loader,
    )
}

/// Issue `count` queries, one debounce window apart.
fn issue(overlay: &mut SearchOverlay, sink: &mut Sink, count: usize) {
    for i in 0..count {
        let now = Duration::from_millis(1_000 * i as u64);
        overlay.set_query(now, &format!("q{i}"));
        overlay.fire_due(now + Duration::from_millis(200), sink);
    }
}

proptest! {
    #[test]
    fn results_are_capped_prefix(total in 0usize..40, cap in 1usize..12) {
        let mut overlay = overlay(cap);
        let mut sink = Sink::default();
        issue(&mut overlay, &mut sink, 1);
        let handles: Vec<ResultHandle> =
            (0..total).map(|i| ResultHandle::new(format!("/p{i}/"))).collect();
        overlay.on_query_complete(sink.tickets[0], Ok(handles), &mut sink);

        let ids: Vec<String> = overlay.session().results.iter().map(|r| r.id.clone()).collect();
        let expected: Vec<String> = (0..total.min(cap)).map(|i| format!("/p{i}/")).collect();
        prop_assert_eq!(ids, expected);
        prop_assert_eq!(sink.resolves, total.min(cap));
    }

    #[test]
    fn only_latest_ticket_applies(queries in 1usize..6, order in proptest::collection::vec(0usize..6, 1..12)) {
        let mut overlay = overlay(8);
        let mut sink = Sink::default();
        issue(&mut overlay, &mut sink, queries);
        prop_assert_eq!(sink.tickets.len(), queries);
        let latest = queries - 1;

        for pick in order {
            let idx = pick % queries;
            let handle = ResultHandle::new(format!("/from-{idx}/"));
            overlay.on_query_complete(sink.tickets[idx], Ok(vec![handle]), &mut sink);
        }

        for item in &overlay.session().results {
            prop_assert_eq!(item.id.clone(), format!("/from-{latest}/"));
        }
    }
}
