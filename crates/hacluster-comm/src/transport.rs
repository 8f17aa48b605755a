//! Transport seam between the communicator and the wire

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::request::RequestData;
use crate::target::NodeAddress;

/// Status and body of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Transport failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Name resolution, refusal, unreachable network or TLS failure
    #[error("{0}")]
    ConnectionFailed(String),

    /// No response before the attempt's timeout
    #[error("Connection timed out after {} ms", .0.as_millis())]
    TimedOut(Duration),

    /// Connection was established but the response could not be read
    #[error("{0}")]
    ResponseInterrupted(String),
}

impl TransportError {
    /// Check if the failure happened before the node answered
    ///
    /// Only such failures move on to the next address of a target.
    #[must_use]
    pub fn is_connection_level(&self) -> bool {
        matches!(
            self,
            TransportError::ConnectionFailed(_) | TransportError::TimedOut(_)
        )
    }
}

/// Sends one request to one address
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        address: &NodeAddress,
        request: &RequestData,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError>;
}
