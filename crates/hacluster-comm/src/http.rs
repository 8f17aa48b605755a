//! HTTPS transport to node agents

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

use crate::error::Result;
use crate::request::RequestData;
use crate::target::NodeAddress;
use crate::transport::{RawResponse, Transport, TransportError};

/// Posts form-encoded requests to `https://<address>/<action>`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport
    ///
    /// Node agents usually serve self-signed certificates, so verification
    /// is opt-in.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(verify_tls: bool) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .cookie_store(true)
            .build()?;
        Ok(Self { client })
    }

    /// Create a transport with custom `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(action = %request.action()), level = "debug")]
    async fn send(
        &self,
        address: &NodeAddress,
        request: &RequestData,
        timeout: Duration,
    ) -> std::result::Result<RawResponse, TransportError> {
        let url = Url::parse(&address.url_for(request.action()))
            .map_err(|e| TransportError::ConnectionFailed(format!("invalid address: {e}")))?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(request.encoded())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::TimedOut(timeout)
                } else {
                    TransportError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::TimedOut(timeout)
            } else {
                TransportError::ResponseInterrupted(e.to_string())
            }
        })?;

        debug!(status = status, "response received");
        Ok(RawResponse { status, body })
    }
}
