#![forbid(unsafe_code)]

//! Folio Web
//!
//! Runs the heading tracker and the search overlay against a host. The
//! [`StepProgram`] is target-independent and deterministic: the host queues
//! events and async completions, sets the clock, and steps. On `wasm32` the
//! crate also exports `FolioWeb`, which mounts both components on the live
//! document through `web-sys` and drives the program from DOM listeners,
//! observer callbacks and `setTimeout`.

pub mod cache;
pub mod config;
pub mod error;
pub mod step_program;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use cache::{FragmentCache, ResultCache};
pub use config::{ConfigError, FolioConfig};
pub use error::WebError;
pub use step_program::{Message, StepProgram, StepResult};

#[cfg(target_arch = "wasm32")]
pub use dom::{DomHost, Inbox};
#[cfg(target_arch = "wasm32")]
pub use wasm::FolioWeb;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct FolioWeb;

#[cfg(not(target_arch = "wasm32"))]
impl FolioWeb {
    /// Mounting needs a browser; natively this only validates `config`.
    pub fn new(config: Option<String>) -> Result<Self, WebError> {
        if let Some(json) = config {
            FolioConfig::from_json(&json)?;
        }
        Ok(Self)
    }
}
