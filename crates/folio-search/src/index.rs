#![forbid(unsafe_code)]

//! Index abstraction.
//!
//! A lookup returns lightweight [`ResultHandle`]s first; each handle's
//! [`ResultData`] is fetched separately and on demand.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Fallback title when a page has neither a meta title nor a title.
pub const UNTITLED: &str = "Untitled";

/// A ranked match, before its payload is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultHandle {
    pub id: String,
}

impl ResultHandle {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// The resolved payload of a result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultData {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub meta_title: Option<String>,
    /// Pre-sanitized HTML; emphasis is `<mark>`.
    pub excerpt_html: String,
}

impl ResultData {
    /// Title shown to the reader: the meta title, else the title, else
    /// [`UNTITLED`]. Blank strings count as missing.
    #[must_use]
    pub fn display_title(&self) -> &str {
        [&self.meta_title, &self.title]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|title| !title.trim().is_empty())
            .unwrap_or(UNTITLED)
    }
}

/// Synchronous index, for native hosts and tests.
///
/// The browser host talks to the JavaScript index asynchronously and never
/// goes through this trait.
pub trait SearchIndex {
    /// Ranked matches for `query`, best first.
    fn search(&self, query: &str) -> Result<Vec<ResultHandle>>;

    /// Payload of a single match.
    fn data(&self, id: &str) -> Result<ResultData>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_title_prefers_meta_then_title() {
        let mut data = ResultData {
            url: "/a/".into(),
            title: Some("Title".into()),
            meta_title: Some("Meta".into()),
            excerpt_html: String::new(),
        };
        assert_eq!(data.display_title(), "Meta");
        data.meta_title = Some(String::new());
        assert_eq!(data.display_title(), "Title");
        data.title = None;
        assert_eq!(data.display_title(), UNTITLED);
    }
}
