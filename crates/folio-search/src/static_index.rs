#![forbid(unsafe_code)]

//! In-memory index built from a JSON page manifest.
//!
//! ```json
//! { "pages": [ { "url": "/posts/a/", "title": "A", "content": "..." } ] }
//! ```
//!
//! Matching is case-insensitive substring search. Ranking: title equals the
//! query, then title contains it, then content contains it; within a rank
//! shorter titles come first, then manifest order.

use std::cmp::Ordering;

use html_escape::encode_text;
use serde::Deserialize;

use crate::error::{IndexError, Result};
use crate::index::{ResultData, ResultHandle, SearchIndex};

/// Characters of context kept on each side of the first match.
const EXCERPT_CONTEXT: usize = 60;

#[derive(Debug, Clone, Deserialize)]
struct Manifest {
    pages: Vec<Page>,
}

#[derive(Debug, Clone, Deserialize)]
struct Page {
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    meta_title: Option<String>,
    #[serde(default)]
    content: String,
}

impl Page {
    fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

/// Manifest-backed [`SearchIndex`].
#[derive(Debug, Clone, Default)]
pub struct StaticIndex {
    pages: Vec<Page>,
}

impl StaticIndex {
    /// Parse a manifest.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)?;
        tracing::debug!(pages = manifest.pages.len(), "static index loaded");
        Ok(Self {
            pages: manifest.pages,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.url == id)
    }
}

impl SearchIndex for StaticIndex {
    fn search(&self, query: &str) -> Result<Vec<ResultHandle>> {
        let term = query.trim().to_lowercase();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let mut matches: Vec<(usize, u8, &Page)> = self
            .pages
            .iter()
            .enumerate()
            .filter_map(|(order, page)| {
                let title = page.title().to_lowercase();
                let score = if title == term {
                    1
                } else if title.contains(&term) {
                    2
                } else if page.content.to_lowercase().contains(&term) {
                    3
                } else {
                    return None;
                };
                Some((order, score, page))
            })
            .collect();

        matches.sort_by(|(order_a, score_a, a), (order_b, score_b, b)| {
            match score_a.cmp(score_b) {
                Ordering::Equal => match a.title().len().cmp(&b.title().len()) {
                    Ordering::Equal => order_a.cmp(order_b),
                    ord => ord,
                },
                ord => ord,
            }
        });

        Ok(matches
            .into_iter()
            .map(|(_, _, page)| ResultHandle::new(page.url.clone()))
            .collect())
    }

    fn data(&self, id: &str) -> Result<ResultData> {
        let page = self.page(id).ok_or_else(|| IndexError::Resolve {
            id: id.to_owned(),
            message: "no such page".to_owned(),
        })?;
        Ok(ResultData {
            url: page.url.clone(),
            title: page.title.clone(),
            meta_title: page.meta_title.clone(),
            excerpt_html: excerpt(&page.content, ""),
        })
    }
}

impl StaticIndex {
    /// Like [`SearchIndex::data`], with the excerpt centred on `query`.
    pub fn data_for_query(&self, id: &str, query: &str) -> Result<ResultData> {
        let mut data = self.data(id)?;
        if let Some(page) = self.page(id) {
            data.excerpt_html = excerpt(&page.content, query.trim());
        }
        Ok(data)
    }
}

/// Build an escaped excerpt around the first case-insensitive occurrence of
/// `term`, wrapping every occurrence inside the window in `<mark>`.
#[must_use]
pub fn excerpt(content: &str, term: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    let lower: Vec<char> = chars.iter().flat_map(|c| c.to_lowercase()).collect();
    let needle: Vec<char> = term.chars().flat_map(char::to_lowercase).collect();

    // Lowercasing may change lengths; only highlight when it did not.
    let positions = if needle.is_empty() || lower.len() != chars.len() {
        Vec::new()
    } else {
        find_all(&lower, &needle)
    };

    let (start, end) = match positions.first() {
        Some(&first) => (
            first.saturating_sub(EXCERPT_CONTEXT),
            (first + needle.len() + EXCERPT_CONTEXT).min(chars.len()),
        ),
        None => (0, (EXCERPT_CONTEXT * 2).min(chars.len())),
    };

    let mut out = String::new();
    if start > 0 {
        out.push('…');
    }
    let mut i = start;
    for &pos in positions.iter().filter(|&&p| p >= start && p + needle.len() <= end) {
        if pos < i {
            continue;
        }
        out.push_str(&encode_text(&chars[i..pos].iter().collect::<String>()));
        out.push_str("<mark>");
        out.push_str(&encode_text(
            &chars[pos..pos + needle.len()].iter().collect::<String>(),
        ));
        out.push_str("</mark>");
        i = pos + needle.len();
    }
    out.push_str(&encode_text(&chars[i..end].iter().collect::<String>()));
    if end < chars.len() {
        out.push('…');
    }
    out
}

fn find_all(haystack: &[char], needle: &[char]) -> Vec<usize> {
    if needle.len() > haystack.len() {
        return Vec::new();
    }
    (0..=haystack.len() - needle.len())
        .filter(|&i| haystack[i..i + needle.len()] == *needle)
        .collect()
}
