#![forbid(unsafe_code)]

//! Heading collection.
//!
//! A [`HeadingSource`] exposes the raw headings of the page's primary content
//! region. [`HeadingCollector`] turns them into the ordered, filtered list of
//! [`HeadingEntry`] values the tracker works with.

use serde::{Deserialize, Serialize};

/// Section level of a tracked heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H2,
    H3,
}

impl HeadingLevel {
    /// Map an `<hN>` rank. Only 2 and 3 are tracked.
    #[must_use]
    pub const fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            2 => Some(Self::H2),
            3 => Some(Self::H3),
            _ => None,
        }
    }

    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::H2 => 2,
            Self::H3 => 3,
        }
    }

    /// Indentation step in the table of contents.
    #[must_use]
    pub const fn indent(self) -> u8 {
        match self {
            Self::H2 => 1,
            Self::H3 => 2,
        }
    }
}

/// One tracked heading, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingEntry {
    /// Anchor id, unique within the page.
    pub id: String,
    /// Visible text, trimmed, without anchor decorations.
    pub text: String,
    pub level: HeadingLevel,
}

/// A heading as the host found it, before filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawHeading {
    /// The `N` of `<hN>`.
    pub rank: u8,
    /// The `id` attribute, if any.
    pub id: Option<String>,
    /// Text content with anchor decorations already removed.
    pub text: String,
}

impl RawHeading {
    #[must_use]
    pub fn new(rank: u8, id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            rank,
            id: Some(id.into()),
            text: text.into(),
        }
    }
}

/// Where headings come from.
pub trait HeadingSource {
    /// Headings inside the primary content container, in document order.
    ///
    /// `None` when the page has no content container at all.
    fn raw_headings(&self) -> Option<Vec<RawHeading>>;
}

/// Filters raw headings into tracked entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingCollector;

impl HeadingCollector {
    /// Collect tracked headings from `source`.
    ///
    /// Headings without an id, with empty text, or outside levels 2 and 3 are
    /// skipped. A missing container yields an empty list.
    #[must_use]
    pub fn collect<S: HeadingSource + ?Sized>(source: &S) -> Vec<HeadingEntry> {
        let Some(raw) = source.raw_headings() else {
            tracing::debug!("no content container; table of contents disabled");
            return Vec::new();
        };
        Self::filter(raw)
    }

    /// Apply the filtering rules to an already extracted list.
    #[must_use]
    pub fn filter(raw: impl IntoIterator<Item = RawHeading>) -> Vec<HeadingEntry> {
        raw.into_iter()
            .filter_map(|heading| {
                let level = HeadingLevel::from_rank(heading.rank)?;
                let id = heading.id.filter(|id| !id.is_empty())?;
                let text = heading.text.trim();
                if text.is_empty() {
                    tracing::trace!(heading = %id, "skipping heading with empty text");
                    return None;
                }
                Some(HeadingEntry {
                    id,
                    text: text.to_owned(),
                    level,
                })
            })
            .collect()
    }
}
