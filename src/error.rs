//! Crate error type

use thiserror::Error;

/// Errors produced by the pocket tools
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PocketError {
    /// Requested countdown duration is non-positive or unparsable
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// Tilt reading could not be mapped (NaN or infinite axis)
    #[error("invalid tilt reading: {0}")]
    InvalidReading(String),

    /// A state mutex was poisoned by a panicking holder
    #[error("failed to lock {0}")]
    LockPoisoned(String),
}

impl PocketError {
    pub(crate) fn lock(what: &str) -> Self {
        Self::LockPoisoned(what.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PocketError>;
