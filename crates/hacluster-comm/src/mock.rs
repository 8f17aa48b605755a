//! Scripted transport for tests

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::request::RequestData;
use crate::target::NodeAddress;
use crate::transport::{RawResponse, Transport, TransportError};

#[derive(Debug, Clone)]
enum Reply {
    Respond {
        delay: Duration,
        response: RawResponse,
    },
    Unreachable,
    TimedOut,
    Interrupted(String),
}

/// One request seen by a [`MockTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub host: String,
    pub action: String,
    pub params: Vec<(String, String)>,
}

/// Transport answering from replies queued per host and action
///
/// Queued replies are consumed in order. A host/action pair with nothing
/// queued behaves like an unreachable address.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<(String, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self, host: &str, action: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((host.to_string(), action.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Answer the next `action` request to `host` with `status` and `body`
    pub fn respond(&self, host: &str, action: &str, status: u16, body: &str) {
        self.respond_after(host, action, Duration::ZERO, status, body);
    }

    /// Like [`respond`](Self::respond) but only after `delay`
    pub fn respond_after(&self, host: &str, action: &str, delay: Duration, status: u16, body: &str) {
        self.queue(
            host,
            action,
            Reply::Respond {
                delay,
                response: RawResponse::new(status, body),
            },
        );
    }

    /// Fail the next `action` request to `host` with a connection error
    pub fn unreachable(&self, host: &str, action: &str) {
        self.queue(host, action, Reply::Unreachable);
    }

    /// Fail the next `action` request to `host` with a timeout
    pub fn timeout(&self, host: &str, action: &str) {
        self.queue(host, action, Reply::TimedOut);
    }

    /// Break the next `action` response from `host` after connecting
    pub fn interrupted(&self, host: &str, action: &str, reason: &str) {
        self.queue(host, action, Reply::Interrupted(reason.to_string()));
    }

    /// Every request seen so far in arrival order
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Hosts that received `action`, in arrival order
    #[must_use]
    pub fn hosts_called(&self, action: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.action == action)
            .map(|call| call.host)
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        address: &NodeAddress,
        request: &RequestData,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                host: address.host.clone(),
                action: request.action().to_string(),
                params: request.params().to_vec(),
            });

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&(address.host.clone(), request.action().to_string()))
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Reply::Respond { delay, response }) => {
                if delay > timeout {
                    tokio::time::sleep(timeout).await;
                    return Err(TransportError::TimedOut(timeout));
                }
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(response)
            }
            Some(Reply::TimedOut) => Err(TransportError::TimedOut(timeout)),
            Some(Reply::Interrupted(reason)) => Err(TransportError::ResponseInterrupted(reason)),
            Some(Reply::Unreachable) | None => Err(TransportError::ConnectionFailed(format!(
                "Could not resolve host: {}",
                address.host
            ))),
        }
    }
}
