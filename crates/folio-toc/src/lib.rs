#![forbid(unsafe_code)]

//! Folio TOC
//!
//! Tracks which section of an article is being read and keeps the table of
//! contents in sync with it.
//!
//! # Key Components
//!
//! - [`HeadingCollector`] - extracts level-2/3 headings with anchor ids
//! - [`VisibilityMap`] - latest intersection record per heading
//! - [`ActiveHeadingResolver`] - picks the active heading after each batch
//! - [`ProgrammaticScrollLock`] - suppresses observer updates during a jump
//! - [`NavRenderer`] - view model, HTML, and nav auto-scroll decisions
//! - [`HeadingTracker`] - the component that owns all of the above
//!
//! The tracker never touches a DOM. It reads the page through [`TocHost`]
//! and [`HeadingSource`], and receives observer batches as plain
//! [`VisibilityRecord`] slices.

pub mod config;
pub mod heading;
pub mod host;
#[cfg(feature = "html")]
pub mod html;
pub mod lock;
pub mod nav;
pub mod resolver;
pub mod tracker;
pub mod visibility;

pub use config::TrackerConfig;
pub use heading::{HeadingCollector, HeadingEntry, HeadingLevel, HeadingSource, RawHeading};
pub use host::TocHost;
#[cfg(feature = "html")]
pub use html::HtmlDocument;
pub use lock::{LockVerdict, ProgrammaticScrollLock};
pub use nav::{NavRenderer, TocItem, TocView};
pub use resolver::{ActiveHeadingResolver, Decision, Resolution};
pub use tracker::{ActiveState, HeadingTracker};
pub use visibility::{VisibilityMap, VisibilityRecord};
