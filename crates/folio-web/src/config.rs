#![forbid(unsafe_code)]

//! Page-level configuration.
//!
//! [`FolioConfig`] bundles the tracker and search tunables. It is read from a
//! JSON object (usually embedded in the page) in which every field is
//! optional, then adjusted by environment overrides on native hosts:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `FOLIO_MODE` | `search.mode` |
//! | `FOLIO_DEBOUNCE_MS` | `search.debounce_ms` |
//! | `FOLIO_MAX_RESULTS` | `search.max_results` |
//! | `FOLIO_LOCK_TIMEOUT_MS` | `toc.lock_timeout_ms` |
//! | `FOLIO_TOC_HEADER` | `toc.show_header` |
//!
//! `navigation_event` names the document event after which the components
//! re-collect headings and reset search; it defaults to Astro's
//! `astro:page-load`.

use folio_core::config::{BuildMode, env_flag, env_u64};
use folio_search::SearchConfig;
use folio_toc::TrackerConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event Astro's client router fires on the document after each navigation.
pub const DEFAULT_NAVIGATION_EVENT: &str = "astro:page-load";

pub const DEBOUNCE_ENV: &str = "FOLIO_DEBOUNCE_MS";
pub const MAX_RESULTS_ENV: &str = "FOLIO_MAX_RESULTS";
pub const LOCK_TIMEOUT_ENV: &str = "FOLIO_LOCK_TIMEOUT_MS";
pub const TOC_HEADER_ENV: &str = "FOLIO_TOC_HEADER";

/// Errors produced while loading a [`FolioConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A field is present but out of range.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Configuration for both page components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub toc: TrackerConfig,
    pub search: SearchConfig,
    /// Document event that triggers a page reload of both components. Empty
    /// disables the listener.
    pub navigation_event: String,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            toc: TrackerConfig::default(),
            search: SearchConfig::default(),
            navigation_event: DEFAULT_NAVIGATION_EVENT.to_owned(),
        }
    }
}

impl FolioConfig {
    /// Parse and validate a JSON config object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides. Unset or unparseable variables are
    /// ignored.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.search.mode = BuildMode::from_env_or(self.search.mode);
        if let Some(ms) = env_u64(DEBOUNCE_ENV) {
            self.search.debounce_ms = ms;
        }
        if let Some(n) = env_u64(MAX_RESULTS_ENV) {
            self.search.max_results = usize::try_from(n).unwrap_or(usize::MAX);
        }
        if let Some(ms) = env_u64(LOCK_TIMEOUT_ENV) {
            self.toc.lock_timeout_ms = ms;
        }
        if let Some(show) = env_flag(TOC_HEADER_ENV) {
            self.toc.show_header = show;
        }
        self
    }

    /// Reject values the components cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_results == 0 {
            return Err(ConfigError::Invalid {
                field: "search.max_results",
                reason: "must be at least 1".into(),
            });
        }
        if !(0.0..1.0).contains(&self.toc.release_fraction) {
            return Err(ConfigError::Invalid {
                field: "toc.release_fraction",
                reason: format!("{} is outside [0, 1)", self.toc.release_fraction),
            });
        }
        if self.toc.activation_offset < 0.0 || !self.toc.activation_offset.is_finite() {
            return Err(ConfigError::Invalid {
                field: "toc.activation_offset",
                reason: "must be a non-negative number".into(),
            });
        }
        if self.toc.lock_tolerance < 0.0 {
            return Err(ConfigError::Invalid {
                field: "toc.lock_tolerance",
                reason: "must be non-negative".into(),
            });
        }
        if self.search.index_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "search.index_path",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(FolioConfig::from_json("{}").unwrap(), FolioConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = FolioConfig::from_json(
            r#"{"toc": {"nav_label": "On this page"}, "search": {"mode": "development"}}"#,
        )
        .unwrap();
        assert_eq!(config.toc.nav_label, "On this page");
        assert_eq!(config.toc.activation_offset, 80.0);
        assert_eq!(config.search.mode, BuildMode::Development);
        assert_eq!(config.search.max_results, 8);
    }

    #[test]
    fn navigation_event_defaults_to_the_astro_router() {
        assert_eq!(FolioConfig::default().navigation_event, "astro:page-load");
        let config = FolioConfig::from_json(r#"{"navigation_event": "turbo:load"}"#).unwrap();
        assert_eq!(config.navigation_event, "turbo:load");
        let config = FolioConfig::from_json(r#"{"navigation_event": ""}"#).unwrap();
        assert!(config.navigation_event.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            FolioConfig::from_json("{toc:"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn zero_results_is_invalid() {
        let err = FolioConfig::from_json(r#"{"search": {"max_results": 0}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "search.max_results",
                ..
            }
        ));
    }

    #[test]
    fn release_fraction_must_leave_a_band() {
        let err = FolioConfig::from_json(r#"{"toc": {"release_fraction": 1.0}}"#).unwrap_err();
        assert!(err.to_string().contains("toc.release_fraction"));
    }

    #[test]
    fn round_trips_through_json() {
        let config = FolioConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(FolioConfig::from_json(&json).unwrap(), config);
    }
}
