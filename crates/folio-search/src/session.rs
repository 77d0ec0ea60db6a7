#![forbid(unsafe_code)]

//! Per-overlay session state.

use crate::index::{ResultData, ResultHandle};
use crate::loader::IndexStatus;

/// Resolution state of one result's payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultState {
    #[default]
    Pending,
    Ready(ResultData),
    /// Resolution failed; the item is not rendered.
    Failed,
}

/// One rendered result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub id: String,
    pub state: ResultState,
}

impl From<ResultHandle> for ResultItem {
    fn from(handle: ResultHandle) -> Self {
        Self {
            id: handle.id,
            state: ResultState::Pending,
        }
    }
}

/// Everything the search panel renders from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchSession {
    /// Current input text, echoed immediately.
    pub query: String,
    /// Mirror of the loader status, as last observed by this overlay.
    pub status: IndexStatus,
    /// Results of the last successful query, best first.
    pub results: Vec<ResultItem>,
    /// Explicitly opened (mobile toggle or mobile shortcut).
    pub open: bool,
    /// A search input has focus.
    pub focused: bool,
}

impl SearchSession {
    /// Whether the query has any non-whitespace text.
    #[must_use]
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Panel visibility: explicitly open, or focused with something to show.
    #[must_use]
    pub fn is_visible(&self, production: bool) -> bool {
        self.open || (self.focused && (self.has_query() || !production))
    }
}
