#![forbid(unsafe_code)]

//! Reading-position tracking against a simulated page.

use core::time::Duration;

use folio_core::event::{Event, Target};
use folio_harness::{FRAME, PageDriver, PageHeading, SimulatedPage, blog_index};
use folio_toc::TocHost;
use folio_web::FolioConfig;
use pretty_assertions::assert_eq;

fn drive(page: SimulatedPage) -> PageDriver {
    PageDriver::new(FolioConfig::default(), page, blog_index().unwrap())
}

fn click_nav(driver: &mut PageDriver, id: &str) {
    let result = driver.send(Event::Click(Target::NavLink(id.to_owned())));
    assert!(result.disposition.is_consumed());
}

#[test]
fn nothing_is_active_above_the_first_heading() {
    let driver = drive(SimulatedPage::three_sections());
    assert!(driver.page().is_observing());
    assert_eq!(driver.active_id(), None);
}

#[test]
fn crossing_the_activation_line_activates_the_heading() {
    let mut driver = drive(SimulatedPage::three_sections());
    driver.wheel_to(1_300.0);
    assert_eq!(driver.active_id(), Some("details"));

    let view = driver.program().toc_view().unwrap();
    assert_eq!(view.active_id(), Some("details"));
    assert!(view.to_html().contains(r##"href="#details""##));
}

#[test]
fn topmost_of_several_visible_headings_wins() {
    let page = SimulatedPage::new(1280, 800.0)
        .with_heading(2, "a", "A", 400.0)
        .with_heading(2, "b", "B", 500.0)
        .with_document_height(3_000.0);
    let mut driver = drive(page);
    driver.wheel_to(300.0);
    assert_eq!(driver.active_id(), Some("a"));
}

#[test]
fn heading_above_the_band_stays_active_between_sections() {
    let mut driver = drive(SimulatedPage::three_sections());
    driver.wheel_to(1_300.0);
    driver.wheel_to(1_900.0);
    assert_eq!(driver.active_id(), Some("details"));
}

#[test]
fn nav_click_holds_target_until_lock_times_out() {
    let mut driver = drive(SimulatedPage::three_sections());
    driver.wheel_to(1_300.0);
    assert_eq!(driver.active_id(), Some("details"));

    click_nav(&mut driver, "sub");
    let clicked = driver.now();
    assert_eq!(driver.active_id(), Some("sub"));
    assert!(driver.program().tracker().is_locked());
    assert_eq!(driver.page().window_scrolls(), [2_320.0]);

    // Mid-animation "details" leaves the band; the target stays active.
    driver.advance(FRAME * 4);
    assert!(driver.page().is_animating());
    assert_eq!(driver.active_id(), Some("sub"));

    // The scroll lands without another observer callback, so only the
    // timeout can release the lock.
    driver.advance(Duration::from_millis(500));
    assert!(!driver.page().is_animating());
    assert_eq!(driver.page().scroll_y(), 2_320.0);
    assert!(driver.program().tracker().is_locked());

    driver.advance_to(clicked + Duration::from_millis(2_400));
    assert!(driver.program().tracker().is_locked());
    driver.advance_to(clicked + Duration::from_millis(2_500) + FRAME);
    assert!(!driver.program().tracker().is_locked());
    assert_eq!(driver.active_id(), Some("sub"));
}

#[test]
fn lock_releases_early_when_target_settles_at_the_line() {
    let mut driver = drive(SimulatedPage::three_sections()).with_scroll_speed(5_000.0);
    driver.wheel_to(1_300.0);

    click_nav(&mut driver, "sub");
    driver.advance(FRAME);
    assert_eq!(driver.page().heading_top("sub"), Some(80.0));
    assert!(!driver.program().tracker().is_locked());
    assert_eq!(driver.active_id(), Some("sub"));
    assert_eq!(driver.program().next_deadline(), None);
}

#[test]
fn wheel_during_jump_releases_lock() {
    let mut driver = drive(SimulatedPage::three_sections());
    click_nav(&mut driver, "sub");
    driver.advance(FRAME * 2);
    assert!(driver.program().tracker().is_locked());

    driver.wheel_to(1_300.0);
    assert!(!driver.program().tracker().is_locked());
    assert!(!driver.page().is_animating());
    assert_eq!(driver.active_id(), Some("details"));
}

#[test]
fn touch_releases_lock() {
    let mut driver = drive(SimulatedPage::three_sections());
    click_nav(&mut driver, "details");
    assert!(driver.program().tracker().is_locked());

    driver.send(Event::TouchStart);
    assert!(!driver.program().tracker().is_locked());
    assert_eq!(driver.program().next_deadline(), None);
}

#[test]
fn second_click_supersedes_first_lock() {
    let mut driver = drive(SimulatedPage::three_sections());
    click_nav(&mut driver, "details");
    driver.advance(FRAME);
    click_nav(&mut driver, "intro");
    assert_eq!(driver.active_id(), Some("intro"));
    assert!(driver.program().tracker().is_locked());
    assert_eq!(driver.page().window_scrolls().len(), 2);
}

#[test]
fn click_on_missing_heading_is_swallowed() {
    let mut driver = drive(SimulatedPage::three_sections());
    click_nav(&mut driver, "nowhere");
    assert!(!driver.program().tracker().is_locked());
    assert!(driver.page().window_scrolls().is_empty());
}

#[test]
fn lock_on_removed_heading_releases_at_next_callback() {
    let mut driver = drive(SimulatedPage::three_sections());
    click_nav(&mut driver, "sub");
    driver.page_mut().remove_heading("sub");

    // At 120px "intro" enters the band and the observer reports it.
    driver.advance(FRAME);
    assert!(!driver.program().tracker().is_locked());
    assert_eq!(driver.active_id(), Some("intro"));
}

#[test]
fn toc_lists_only_headings_with_anchors() {
    let page = SimulatedPage::three_sections().with_raw_heading(PageHeading {
        rank: 2,
        id: None,
        text: "Loose".to_owned(),
        top: 1_800.0,
        height: 32.0,
    });
    let driver = drive(page);
    let view = driver.program().toc_view().unwrap();
    let ids: Vec<&str> = view.items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, ["intro", "details", "sub"]);
    assert_eq!(driver.page().observed_ids(), ["intro", "details", "sub"]);
}

#[test]
fn page_without_article_renders_nothing() {
    let driver = drive(SimulatedPage::three_sections().without_article());
    assert!(driver.program().toc_view().is_none());
    assert!(!driver.page().is_observing());
}

#[test]
fn page_load_disconnects_before_observing_new_headings() {
    let mut driver = drive(SimulatedPage::three_sections());
    driver.wheel_to(1_300.0);

    driver.page_mut().remove_heading("details");
    driver.program_mut().page_load();
    driver.pump();

    assert_eq!(driver.page().disconnect_count(), 1);
    assert_eq!(driver.page().observe_count(), 2);
    assert_eq!(driver.page().observed_ids(), ["intro", "sub"]);
    assert_eq!(driver.program().tracker().headings().len(), 2);
}

#[test]
fn active_link_is_revealed_in_a_scrolled_nav() {
    let mut page = SimulatedPage::new(1280, 800.0).with_document_height(7_000.0);
    for n in 0..10 {
        let top = 400.0 + 600.0 * f64::from(n);
        page = page.with_heading(2, &format!("s{n}"), &format!("Section {n}"), top);
    }
    let mut driver = drive(page);
    driver.wheel_to(5_100.0);

    assert_eq!(driver.active_id(), Some("s8"));
    assert_eq!(driver.page().nav_reveals().last().map(String::as_str), Some("s8"));
    assert!(driver.page().nav_scroll() > 0.0);
}
