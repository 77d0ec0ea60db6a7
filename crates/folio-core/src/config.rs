#![forbid(unsafe_code)]

//! Build mode and environment helpers shared by every component config.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Environment variable that selects the [`BuildMode`] on native hosts.
pub const MODE_ENV: &str = "FOLIO_MODE";

/// Whether the page was produced by a production build.
///
/// The search index only exists in production output; development pages
/// show a notice instead of querying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Production,
    Development,
}

impl BuildMode {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Read [`MODE_ENV`], falling back to `default` when unset or invalid.
    #[must_use]
    pub fn from_env_or(default: Self) -> Self {
        env_string(MODE_ENV)
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a build mode string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBuildModeError(String);

impl fmt::Display for ParseBuildModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown build mode: {}", self.0)
    }
}

impl std::error::Error for ParseBuildModeError {}

impl FromStr for BuildMode {
    type Err = ParseBuildModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(ParseBuildModeError(other.to_string())),
        }
    }
}

/// Read a boolean flag. Unset or blank values yield `None`.
#[must_use]
pub fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(matches!(
        trimmed,
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON"
    ))
}

/// Read an unsigned integer. Unparseable values yield `None`.
#[must_use]
pub fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
}

/// Read a non-blank string, trimmed.
#[must_use]
pub fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
