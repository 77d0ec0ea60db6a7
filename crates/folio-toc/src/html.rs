#![forbid(unsafe_code)]

//! Heading extraction from rendered HTML.
//!
//! [`HtmlDocument`] parses a full page with `scraper` and serves as a
//! [`HeadingSource`] for native hosts: the first `<article>` is the content
//! container, and its `h2`/`h3` descendants are the candidate headings.
//! Permalink decorations (`.anchor`, `.anchor-icon`) do not contribute text.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::heading::{HeadingSource, RawHeading};

static ARTICLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("article").expect("BUG: hardcoded CSS selector 'article' is invalid")
});

static HEADING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2, h3").expect("BUG: hardcoded CSS selector 'h2, h3' is invalid")
});

const DECORATION_CLASSES: [&str; 2] = ["anchor", "anchor-icon"];

/// A parsed HTML page.
pub struct HtmlDocument {
    html: Html,
}

impl std::fmt::Debug for HtmlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlDocument").finish_non_exhaustive()
    }
}

impl HtmlDocument {
    #[must_use]
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }
}

impl HeadingSource for HtmlDocument {
    fn raw_headings(&self) -> Option<Vec<RawHeading>> {
        let article = self.html.select(&ARTICLE_SELECTOR).next()?;
        let headings = article
            .select(&HEADING_SELECTOR)
            .map(|element| {
                let rank = element
                    .value()
                    .name()
                    .strip_prefix('h')
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(0);
                let mut text = String::new();
                push_visible_text(element, &mut text);
                RawHeading {
                    rank,
                    id: element.value().attr("id").map(str::to_owned),
                    text,
                }
            })
            .collect();
        Some(headings)
    }
}

fn is_decoration(element: &ElementRef<'_>) -> bool {
    element
        .value()
        .classes()
        .any(|class| DECORATION_CLASSES.contains(&class))
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if !is_decoration(&child) {
                push_visible_text(child, out);
            }
        }
    }
}
