#![forbid(unsafe_code)]

//! Table-of-contents view model and rendering.

use std::fmt::Write as _;

use folio_core::geometry::Bounds;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::config::TrackerConfig;
use crate::heading::{HeadingEntry, HeadingLevel};

/// One rendered link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocItem {
    pub id: String,
    /// `#id`.
    pub href: String,
    pub text: String,
    pub level: HeadingLevel,
    /// Indentation steps (level 2 is one step, level 3 two).
    pub indent: u8,
    pub active: bool,
}

/// The whole nav. Only produced when there is at least one heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocView {
    /// `aria-label` of the nav, also shown as the header text.
    pub label: String,
    pub show_header: bool,
    pub items: Vec<TocItem>,
}

impl TocView {
    /// Id of the highlighted item.
    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.active)
            .map(|item| item.id.as_str())
    }

    /// Render as an HTML fragment. All text and attribute values are escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<nav aria-label="{}" class="toc-nav">"#,
            encode_double_quoted_attribute(&self.label)
        );
        if self.show_header {
            let _ = write!(
                out,
                r#"<div class="toc-header"><span>{}</span></div>"#,
                encode_text(&self.label)
            );
        }
        out.push_str(r#"<ul class="toc-list">"#);
        for item in &self.items {
            let _ = write!(
                out,
                r#"<li><a href="{}" class="toc-link toc-indent-{}{}"{}>{}</a></li>"#,
                encode_double_quoted_attribute(&item.href),
                item.indent,
                if item.active { " toc-active" } else { "" },
                if item.active {
                    r#" aria-current="location""#
                } else {
                    ""
                },
                encode_text(&item.text)
            );
        }
        out.push_str("</ul></nav>");
        out
    }
}

/// Builds [`TocView`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavRenderer;

impl NavRenderer {
    /// Render the nav, or `None` for a page without headings.
    #[must_use]
    pub fn render(
        headings: &[HeadingEntry],
        active_id: Option<&str>,
        config: &TrackerConfig,
    ) -> Option<TocView> {
        if headings.is_empty() {
            return None;
        }
        let items = headings
            .iter()
            .map(|heading| TocItem {
                id: heading.id.clone(),
                href: format!("#{}", heading.id),
                text: heading.text.clone(),
                level: heading.level,
                indent: heading.level.indent(),
                active: active_id == Some(heading.id.as_str()),
            })
            .collect();
        Some(TocView {
            label: config.nav_label.clone(),
            show_header: config.show_header,
            items,
        })
    }

    /// Whether an active link at `link` must be scrolled into the nav's
    /// scroll container at `container`, given an inner `padding`.
    #[must_use]
    pub fn link_out_of_view(link: &Bounds, container: &Bounds, padding: f64) -> bool {
        link.top < container.top + padding || link.bottom > container.bottom - padding
    }
}
