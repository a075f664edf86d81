//! Error types for the bridge controller.

use std::convert::Infallible;

use thiserror::Error;

/// Errors produced while validating command arguments.
///
/// Validation happens before anything is queued for transmission, so a
/// [`CommandError`] always means zero bytes went on the wire for that call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// A command code was not exactly three bytes long.
    #[error("command code must be exactly 3 bytes, got {len}")]
    InvalidLength {
        /// Length of the rejected code.
        len: usize,
    },
}

impl From<Infallible> for CommandError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Errors surfaced by the public controller operations.
#[derive(Debug, Error)]
pub enum SendError {
    /// A malformed command argument; the call was rejected before any
    /// transmission was attempted.
    #[error("invalid command argument: {0}")]
    Command(#[from] CommandError),

    /// The controller's background tasks are gone (runtime shut down while
    /// the operation was queued).
    #[error("controller has shut down")]
    Shutdown,
}
