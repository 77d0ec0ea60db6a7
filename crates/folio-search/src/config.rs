#![forbid(unsafe_code)]

//! Search overlay configuration.

use core::time::Duration;

use folio_core::config::BuildMode;
use serde::{Deserialize, Serialize};

/// Tunables for the search overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a query runs.
    pub debounce_ms: u64,
    /// Maximum number of rendered results.
    pub max_results: usize,
    /// Viewport width (px) at and above which the desktop input is used.
    pub desktop_breakpoint: u32,
    /// Delay before focusing the mobile input, so the panel can appear first.
    pub mobile_focus_delay_ms: u64,
    /// Static path of the index module.
    pub index_path: String,
    pub mode: BuildMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            max_results: 8,
            desktop_breakpoint: 768,
            mobile_focus_delay_ms: 100,
            index_path: "/pagefind/pagefind.js".to_owned(),
            mode: BuildMode::Production,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub fn mobile_focus_delay(&self) -> Duration {
        Duration::from_millis(self.mobile_focus_delay_ms)
    }
}
