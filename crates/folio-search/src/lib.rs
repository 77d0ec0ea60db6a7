#![forbid(unsafe_code)]

//! Folio Search
//!
//! Header search for Folio pages: an index loaded lazily on first
//! interaction, debounced incremental queries, per-result lazy payloads, and
//! the keyboard and focus handling shared by the desktop and mobile inputs.
//!
//! # Key Components
//!
//! - [`IndexLoader`] - process-wide, load-at-most-once index handle
//! - [`QueryDebouncer`] - single pending query execution
//! - [`QueryExecutor`] - tickets that make stale completions harmless
//! - [`ResultRenderer`] - panel view model
//! - [`ShortcutDispatcher`] / [`FocusManager`] - Cmd/Ctrl+K, Escape, focus
//! - [`SearchOverlay`] - the component
//! - [`StaticIndex`] - manifest-backed [`SearchIndex`] for native hosts

pub mod config;
pub mod debounce;
pub mod error;
pub mod executor;
pub mod focus;
pub mod host;
pub mod index;
pub mod loader;
pub mod overlay;
pub mod render;
pub mod session;
pub mod shortcut;
pub mod static_index;

pub use config::SearchConfig;
pub use debounce::QueryDebouncer;
pub use error::IndexError;
pub use executor::{QueryExecutor, QueryTicket};
pub use focus::FocusManager;
pub use host::SearchHost;
pub use index::{ResultData, ResultHandle, SearchIndex};
pub use loader::{IndexLoader, IndexStatus, LoadOutcome, LoadRequest};
pub use overlay::SearchOverlay;
pub use render::{Notice, PanelBody, PanelView, ResultRenderer, ResultRow};
pub use session::{ResultItem, ResultState, SearchSession};
pub use shortcut::{Presentation, Shortcut, ShortcutDispatcher};
pub use static_index::StaticIndex;
