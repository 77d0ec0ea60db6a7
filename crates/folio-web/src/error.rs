#![forbid(unsafe_code)]

use thiserror::Error;

use crate::config::ConfigError;

/// Failures while mounting the components on a live page.
#[derive(Debug, Error)]
pub enum WebError {
    /// Not running in a browsing context.
    #[error("no global window")]
    MissingWindow,

    /// A DOM or JavaScript call threw.
    #[error("javascript error: {0}")]
    Js(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
