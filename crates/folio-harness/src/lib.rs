#![forbid(unsafe_code)]

//! Folio Harness
//!
//! Deterministic end-to-end testing for the reading-position tracker and
//! the search overlay. A [`SimulatedPage`] stands in for the browser: it
//! lays headings out on a scrollable document, answers geometry queries,
//! runs an intersection observer over the reading band, and records every
//! side effect. A [`PageDriver`] wires the page to a
//! [`folio_web::StepProgram`] and a [`folio_search::StaticIndex`] and moves
//! time forward in animation frames.
//!
//! ```ignore
//! let mut driver = PageDriver::new(
//!     FolioConfig::default(),
//!     SimulatedPage::three_sections(),
//!     blog_index()?,
//! );
//! driver.wheel_to(1_300.0);
//! assert_eq!(driver.active_id(), Some("details"));
//! ```

pub mod driver;
pub mod page;

pub use driver::{DEFAULT_SCROLL_SPEED, FRAME, ImportBehavior, PageDriver};
pub use page::{HEADING_HEIGHT, NAV_ROW_HEIGHT, PageHeading, Requests, SimulatedPage};

use folio_search::{IndexError, StaticIndex};

/// Build a [`StaticIndex`] from `(url, title, content)` triples.
pub fn manifest(pages: &[(&str, &str, &str)]) -> Result<StaticIndex, IndexError> {
    let pages: Vec<serde_json::Value> = pages
        .iter()
        .map(|(url, title, content)| {
            serde_json::json!({ "url": url, "title": title, "content": content })
        })
        .collect();
    let json = serde_json::json!({ "pages": pages }).to_string();
    StaticIndex::from_json(&json)
}

/// A small blog: twelve posts mention "rust", two do not.
pub fn blog_index() -> Result<StaticIndex, IndexError> {
    let mut pages: Vec<(String, String, String)> = (1..=12)
        .map(|n| {
            (
                format!("/posts/rust-{n:02}/"),
                format!("Rust notes {n}"),
                format!("Part {n} of a series about writing Rust for the web."),
            )
        })
        .collect();
    pages.push((
        "/posts/sourdough/".to_owned(),
        "Sourdough".to_owned(),
        "Flour, water, salt and patience.".to_owned(),
    ));
    pages.push((
        "/posts/cycling/".to_owned(),
        "Cycling the coast".to_owned(),
        "Three days along the cliffs.".to_owned(),
    ));
    let borrowed: Vec<(&str, &str, &str)> = pages
        .iter()
        .map(|(url, title, content)| (url.as_str(), title.as_str(), content.as_str()))
        .collect();
    manifest(&borrowed)
}
