//! Error types for hacluster-comm

use thiserror::Error;

/// Local errors raised before any network I/O
///
/// Remote failures are never reported through this type; they become
/// [`crate::CommunicationResult`]s and report items.
#[derive(Error, Debug)]
pub enum CommError {
    /// Target was given no address to contact
    #[error("node '{0}' has no address")]
    EmptyAddressList(String),

    /// HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type for communication setup
pub type Result<T> = std::result::Result<T, CommError>;
