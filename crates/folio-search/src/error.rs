#![forbid(unsafe_code)]

use thiserror::Error;

/// Failures of the search index and its lookups.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index module could not be imported.
    #[error("failed to load search index from {path}: {message}")]
    Load { path: String, message: String },

    /// A lookup threw.
    #[error("search query failed: {0}")]
    Query(String),

    /// A result's payload could not be resolved.
    #[error("failed to resolve result {id}: {message}")]
    Resolve { id: String, message: String },

    /// A static index manifest did not parse.
    #[error("invalid index manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;
