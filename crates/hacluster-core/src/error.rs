//! Core error types for hacluster-core

use thiserror::Error;

use hacluster_comm::CommError;
use hacluster_report::LibraryError;

/// Errors that stop a library call before or outside the report stream
#[derive(Error, Debug)]
pub enum CoreError {
    /// Library call failed
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// Communication setup failed
    #[error(transparent)]
    Comm(#[from] CommError),
}

impl CoreError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        CoreError::Library(LibraryError::InvalidInput(message.into()))
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
