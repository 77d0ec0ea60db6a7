#![forbid(unsafe_code)]

//! Folio Runtime
//!
//! Single-threaded coordination primitives shared by the page components.
//! Nothing here blocks or spawns threads: the host owns the event loop and
//! advances time explicitly, which keeps every component deterministic under
//! test and suitable for `wasm32-unknown-unknown`.
//!
//! # Key Components
//!
//! - [`Clock`] / [`DeterministicClock`] / [`SystemClock`] - monotonic time sources
//! - [`TimerQueue`] - cancellable one-shot deadlines keyed by [`TimerHandle`]
//! - [`Store`] - observable state with change notification
//! - [`CancelToken`] - guards asynchronous continuations against teardown
//! - [`OneShot`] - fire-once broadcast with any number of listeners
//! - [`TeardownScope`] - ordered release of side effects on every exit path

pub mod broadcast;
pub mod cancel;
pub mod clock;
pub mod store;
pub mod teardown;
pub mod timer;

pub use broadcast::{Listener, OneShot};
pub use cancel::CancelToken;
pub use clock::{Clock, DeterministicClock, SystemClock};
pub use store::{Store, SubscriberId};
pub use teardown::TeardownScope;
pub use timer::{TimerHandle, TimerQueue};
