#![forbid(unsafe_code)]

//! Search overlay end to end: index import, debounced queries, result
//! resolution and body scroll locking against a simulated page.

use core::time::Duration;

use folio_core::config::BuildMode;
use folio_core::event::{Event, InputSlot, KeyCode, KeyEvent, Modifiers, Target};
use folio_harness::{ImportBehavior, PageDriver, SimulatedPage, blog_index};
use folio_search::{IndexError, IndexStatus, Notice, PanelBody, ResultRow};
use folio_web::FolioConfig;
use pretty_assertions::assert_eq;

const SETTLE: Duration = Duration::from_millis(300);

fn desktop() -> PageDriver {
    PageDriver::new(
        FolioConfig::default(),
        SimulatedPage::three_sections().with_body_overflow("scroll"),
        blog_index().unwrap(),
    )
}

fn focus(driver: &mut PageDriver) {
    driver.send(Event::Focus(Target::SearchInput(InputSlot::Desktop)));
}

fn search(driver: &mut PageDriver, text: &str) {
    driver.type_query(text);
    driver.advance(SETTLE);
}

fn titles(driver: &PageDriver) -> Vec<String> {
    match driver.program().panel_view().body {
        PanelBody::Results(rows) => rows
            .into_iter()
            .filter_map(|row| match row {
                ResultRow::Ready { title, .. } => Some(title),
                ResultRow::Loading { .. } => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[test]
fn focusing_the_input_loads_the_index() {
    let mut driver = desktop();
    assert_eq!(driver.program().loader().status(), IndexStatus::Idle);

    focus(&mut driver);
    assert!(driver.program().loader().is_ready());
    assert_eq!(
        driver.program().overlay().session().status,
        IndexStatus::Ready
    );
}

#[test]
fn typing_shows_the_first_eight_matches() {
    let mut driver = desktop();
    focus(&mut driver);
    search(&mut driver, "rust");

    let view = driver.program().panel_view();
    assert!(view.visible);
    assert!(view.notices.is_empty());
    let expected: Vec<String> = (1..=8).map(|n| format!("Rust notes {n}")).collect();
    assert_eq!(titles(&driver), expected);
    assert_eq!(driver.program().overlay().queries_issued(), 1);
}

#[test]
fn bursts_of_typing_issue_one_query() {
    let mut driver = desktop();
    focus(&mut driver);
    for text in ["s", "so", "sou", "sourdough"] {
        driver.type_query(text);
        driver.advance(Duration::from_millis(48));
    }
    assert_eq!(driver.program().overlay().queries_issued(), 0);

    driver.advance(SETTLE);
    assert_eq!(driver.program().overlay().queries_issued(), 1);
    assert_eq!(titles(&driver), ["Sourdough"]);
}

#[test]
fn unmatched_query_renders_no_results() {
    let mut driver = desktop();
    focus(&mut driver);
    search(&mut driver, "zeppelin");
    assert_eq!(driver.program().panel_view().body, PanelBody::NoResults);
}

#[test]
fn clearing_the_query_clears_results_without_searching() {
    let mut driver = desktop();
    focus(&mut driver);
    search(&mut driver, "rust");
    search(&mut driver, "   ");

    assert_eq!(driver.program().overlay().queries_issued(), 1);
    assert!(driver.program().overlay().session().results.is_empty());
    assert!(!driver.program().panel_view().visible);
}

#[test]
fn excerpts_highlight_the_query() {
    let mut driver = desktop();
    focus(&mut driver);
    search(&mut driver, "patience");

    let PanelBody::Results(rows) = driver.program().panel_view().body else {
        panic!("expected results");
    };
    let [ResultRow::Ready { url, excerpt_html, .. }] = rows.as_slice() else {
        panic!("expected one resolved row, got {rows:?}");
    };
    assert_eq!(url, "/posts/sourdough/");
    assert!(excerpt_html.contains("<mark>patience</mark>"));
}

#[test]
fn out_of_order_completion_keeps_latest_query() {
    let mut driver = desktop();
    focus(&mut driver);
    driver.pause_async();

    search(&mut driver, "rust");
    search(&mut driver, "cycling");
    let held: Vec<_> = driver.held().queries.clone();
    assert_eq!(held.len(), 2);
    let (older, _) = held[0].clone();
    let (newer, _) = held[1].clone();

    driver.deliver_query(newer);
    driver.deliver_query(older);
    driver.resume_async();

    assert_eq!(titles(&driver), ["Cycling the coast"]);
}

#[test]
fn body_overflow_is_restored_across_open_close_cycles() {
    let mut driver = desktop();
    for _ in 0..2 {
        focus(&mut driver);
        search(&mut driver, "rust");
        assert_eq!(driver.page().body_overflow_value(), "hidden");

        driver.send(Event::Key(KeyEvent::new(KeyCode::Escape)));
        assert!(!driver.program().panel_view().visible);
        assert_eq!(driver.page().body_overflow_value(), "scroll");
    }
    assert_eq!(
        driver.page().overflow_log(),
        ["hidden", "scroll", "hidden", "scroll"]
    );
}

#[test]
fn scrim_and_result_clicks_close_the_panel() {
    let mut driver = desktop();
    focus(&mut driver);
    search(&mut driver, "rust");

    let result = driver.send(Event::PointerDown(Target::Scrim));
    assert!(result.disposition.is_consumed());
    assert!(!driver.program().panel_view().visible);

    focus(&mut driver);
    assert!(driver.program().panel_view().visible);
    driver.send(Event::Click(Target::SearchResult("/posts/rust-01/".to_owned())));
    assert!(!driver.program().panel_view().visible);
    assert_eq!(driver.page().body_overflow_value(), "scroll");
}

#[test]
fn shortcut_on_mobile_opens_and_focuses_after_delay() {
    let mut driver = PageDriver::new(
        FolioConfig::default(),
        SimulatedPage::new(480, 800.0),
        blog_index().unwrap(),
    );
    let chord = KeyEvent::new(KeyCode::Char('k')).with_modifiers(Modifiers::CTRL);
    let result = driver.send(Event::Key(chord));
    assert!(result.disposition.is_consumed());
    assert!(driver.program().panel_view().visible);
    assert_eq!(driver.page().focused(), None);

    driver.advance(Duration::from_millis(112));
    assert_eq!(driver.page().focused(), Some(InputSlot::Mobile));
}

#[test]
fn slow_import_drops_queries_until_ready() {
    let mut driver = desktop().with_import(ImportBehavior::Hold);
    focus(&mut driver);
    assert_eq!(driver.held().imports, ["/pagefind/pagefind.js"]);

    search(&mut driver, "rust");
    assert_eq!(driver.program().overlay().queries_issued(), 0);
    assert_eq!(driver.program().panel_view().notices, [Notice::Loading]);

    driver.finish_import(Ok(()));
    assert!(driver.program().loader().is_ready());
    assert_eq!(driver.program().overlay().queries_issued(), 0);

    search(&mut driver, "rust");
    assert_eq!(driver.program().overlay().queries_issued(), 1);
    assert_eq!(titles(&driver).len(), 8);
}

#[test]
fn failed_import_is_not_retried() {
    let mut driver = desktop().with_import(ImportBehavior::Fail("404".to_owned()));
    focus(&mut driver);
    assert_eq!(driver.program().loader().status(), IndexStatus::Error);
    assert_eq!(driver.program().panel_view().notices, [Notice::IndexFailed]);

    driver.pause_async();
    driver.send(Event::Key(KeyEvent::new(KeyCode::Escape)));
    focus(&mut driver);
    search(&mut driver, "rust");
    assert!(driver.held().imports.is_empty());
    assert!(driver.held().queries.is_empty());
}

#[test]
fn held_import_can_fail_later() {
    let mut driver = desktop().with_import(ImportBehavior::Hold);
    focus(&mut driver);
    driver.finish_import(Err(IndexError::Load {
        path: "/pagefind/pagefind.js".to_owned(),
        message: "network".to_owned(),
    }));
    assert_eq!(
        driver.program().overlay().session().status,
        IndexStatus::Error
    );
}

#[test]
fn development_build_shows_notice_and_never_imports() {
    let mut config = FolioConfig::default();
    config.search.mode = BuildMode::Development;
    let mut driver = PageDriver::new(config, SimulatedPage::three_sections(), blog_index().unwrap());
    driver.pause_async();

    focus(&mut driver);
    let view = driver.program().panel_view();
    assert!(view.visible);
    assert_eq!(view.notices, [Notice::DevelopmentMode]);
    assert!(driver.held().imports.is_empty());
}
