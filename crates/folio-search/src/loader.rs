#![forbid(unsafe_code)]

//! Process-wide lazy index loader.
//!
//! The index is imported at most once per page process, on first demand.
//! The first [`request`](IndexLoader::request) moves the loader to
//! `Loading` and tells its caller to start the import; every later request
//! sees `Loading`, `Ready` or `Error` and does nothing. When the host reports
//! the import's outcome through [`complete`](IndexLoader::complete), the
//! result is broadcast to every overlay listening on the loader.
//!
//! ```text
//!  Idle ──request──► Loading ──complete(Ok)──► Ready
//!                       │
//!                       └──complete(Err)──► Error   (no retry)
//! ```

use std::cell::Cell;
use std::rc::Rc;

use folio_runtime::{Listener, OneShot};

use crate::error::IndexError;

/// Lifecycle of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// What a load request should lead to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadRequest {
    /// First request: the caller must start the import now.
    Start,
    /// Someone else already started it.
    AlreadyLoading,
    Ready,
    /// A previous import failed; nothing will be retried.
    Failed,
}

/// The broadcast payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Ready,
    Failed,
}

#[derive(Debug, Default)]
struct Shared {
    status: Cell<IndexStatus>,
    done: OneShot<LoadOutcome>,
}

/// Shared handle to the loader. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct IndexLoader {
    shared: Rc<Shared>,
}

thread_local! {
    static GLOBAL: IndexLoader = IndexLoader::new();
}

impl IndexLoader {
    /// A loader independent of the process-wide one.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide loader.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.with(Clone::clone)
    }

    #[must_use]
    pub fn status(&self) -> IndexStatus {
        self.shared.status.get()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status() == IndexStatus::Ready
    }

    /// Ask for the index.
    pub fn request(&self) -> LoadRequest {
        match self.status() {
            IndexStatus::Idle => {
                self.shared.status.set(IndexStatus::Loading);
                tracing::debug!("search index load started");
                LoadRequest::Start
            }
            IndexStatus::Loading => LoadRequest::AlreadyLoading,
            IndexStatus::Ready => LoadRequest::Ready,
            IndexStatus::Error => LoadRequest::Failed,
        }
    }

    /// Record the import's outcome and notify listeners.
    ///
    /// Ignored unless a load is in progress.
    pub fn complete(&self, result: Result<(), IndexError>) {
        if self.status() != IndexStatus::Loading {
            tracing::trace!(status = ?self.status(), "index completion without pending load");
            return;
        }
        let outcome = match result {
            Ok(()) => {
                tracing::info!("search index ready");
                self.shared.status.set(IndexStatus::Ready);
                LoadOutcome::Ready
            }
            Err(error) => {
                tracing::error!(%error, "search index failed to load");
                self.shared.status.set(IndexStatus::Error);
                LoadOutcome::Failed
            }
        };
        self.shared.done.fire(outcome);
    }

    /// Listen for the completion broadcast.
    #[must_use]
    pub fn listen(&self) -> Listener<LoadOutcome> {
        self.shared.done.listen()
    }
}
