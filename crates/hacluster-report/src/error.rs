//! Error types for library operations

use thiserror::Error;

use crate::item::ReportItem;

/// Errors that end a library call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// Error reports were accumulated and the operation cannot continue
    #[error("operation aborted with {} error(s)", errors.len())]
    OperationAborted {
        /// Every error-severity report accumulated so far
        errors: Vec<ReportItem>,
    },

    /// Local input was malformed before any remote work started
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
