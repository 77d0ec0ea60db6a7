#![forbid(unsafe_code)]

//! Folio public facade crate.
//!
//! Re-exports the reading-position tracker, the search overlay and the
//! page driver from the internal crates, plus a prelude for everyday use.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use folio_core::config::BuildMode;
pub use folio_core::event::{
    Event, EventDisposition, InputSlot, KeyCode, KeyEvent, KeyEventKind, Modifiers, Target,
};
pub use folio_core::geometry::{Bounds, RootMargin};

// --- Runtime re-exports ----------------------------------------------------

pub use folio_runtime::{CancelToken, Clock, DeterministicClock, Store, SystemClock, TimerQueue};

// --- Table of contents re-exports -----------------------------------------

pub use folio_toc::{HeadingSource, HeadingTracker, TocHost, TocView, TrackerConfig};

// --- Search re-exports -----------------------------------------------------

pub use folio_search::{
    IndexError, IndexLoader, PanelView, SearchConfig, SearchHost, SearchIndex, SearchOverlay,
    StaticIndex,
};

// --- Web re-exports --------------------------------------------------------

pub use folio_web::{ConfigError, FolioConfig, FolioWeb, Message, StepProgram, WebError};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Folio embedders.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be parsed or is out of range.
    Config(ConfigError),
    /// The search index failed to load, query or resolve.
    Index(IndexError),
    /// Browser-side failure.
    Web(WebError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Index(err) => write!(f, "{err}"),
            Self::Web(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Index(err) => Some(err),
            Self::Web(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<IndexError> for Error {
    fn from(err: IndexError) -> Self {
        Self::Index(err)
    }
}

impl From<WebError> for Error {
    fn from(err: WebError) -> Self {
        Self::Web(err)
    }
}

/// Standard result type for Folio APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Parse a JSON configuration, apply `FOLIO_*` environment overrides and
/// validate the result.
pub fn load_config(json: Option<&str>) -> Result<FolioConfig> {
    let config = match json {
        Some(json) => FolioConfig::from_json(json)?,
        None => FolioConfig::default(),
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, Event, EventDisposition, FolioConfig, HeadingTracker, Result, SearchOverlay,
        StaticIndex, StepProgram, Target,
    };

    pub use crate::{core, runtime, search, toc, web};
}

pub use folio_core as core;
pub use folio_runtime as runtime;
pub use folio_search as search;
pub use folio_toc as toc;
pub use folio_web as web;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_loads() {
        let config = load_config(None).unwrap();
        assert_eq!(config.search.max_results, 8);
        assert_eq!(config.navigation_event, "astro:page-load");
    }

    #[test]
    fn json_sections_survive_loading() {
        let config =
            load_config(Some(r#"{ "toc": { "nav_label": "Contents" }, "navigation_event": "" }"#))
                .unwrap();
        assert_eq!(config.toc.nav_label, "Contents");
        assert_eq!(config.navigation_event, "");
    }

    #[test]
    fn invalid_config_maps_to_config_error() {
        let err = load_config(Some(r#"{ "search": { "max_results": 0 } }"#)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = load_config(Some("{")).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Json(_))));
    }
}
