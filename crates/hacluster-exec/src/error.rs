//! Error types for hacluster-exec

use std::time::Duration;

use thiserror::Error;

/// Errors that prevent a local command from producing a result
///
/// A command that runs and exits non-zero is not an error; its status is
/// reported in [`crate::CommandResult`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// Argument list was empty
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Process spawn error
    #[error("failed to spawn process: {0}")]
    SpawnError(String),

    /// I/O error while talking to the process
    #[error("I/O error: {0}")]
    IoError(String),

    /// Command timed out
    #[error("command timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },
}
