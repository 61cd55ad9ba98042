//! Error types.

use thiserror::Error;

/// Why a notification could not be shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShowError {
    #[error("no notification anchor is registered")]
    NoAnchor,

    #[error("insertion point {0} is not an allocated element")]
    MissingInsertionPoint(usize),

    #[error("no connected positions are configured")]
    NoPositions,

    /// The deferred resolution was dropped before its tick ran.
    #[error("show was abandoned before the overlay settled")]
    Abandoned,
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid notification config: {0}")]
    Parse(#[from] toml::de::Error),
}
