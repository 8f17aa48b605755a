//! Single-target request execution with address fallback

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use hacluster_report::{ReportItem, ReportMessage};

use crate::request::RequestData;
use crate::response::{CommunicationResult, ErrorKind, Outcome};
use crate::target::{AddressCursor, NodeAddress, Target};
use crate::transport::{Transport, TransportError};

/// Default timeout of one request to one address
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of targets contacted at the same time
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Tunables of a [`NodeCommunicator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunicatorSettings {
    /// Timeout of one attempt against one address
    pub request_timeout: Duration,
    /// Optional limit on all attempts against one target together
    pub target_timeout: Option<Duration>,
    /// Maximum number of targets in flight for one command
    pub max_concurrency: usize,
}

impl Default for CommunicatorSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            target_timeout: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl CommunicatorSettings {
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_target_timeout(mut self, timeout: Duration) -> Self {
        self.target_timeout = Some(timeout);
        self
    }

    /// Set the concurrency ceiling, at least one
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }
}

/// Result of one call plus the reports produced while making it
#[derive(Debug, Clone)]
pub struct Exchange {
    pub result: CommunicationResult,
    pub reports: Vec<ReportItem>,
}

/// Performs one remote action against one target
///
/// Remote failures are returned as data in the [`Exchange`]; `call` never
/// fails.
pub struct NodeCommunicator {
    transport: Arc<dyn Transport>,
    settings: CommunicatorSettings,
    proxy_set: bool,
    proxy_reported: AtomicBool,
}

impl NodeCommunicator {
    /// Create a communicator on top of `transport`
    pub fn new(transport: Arc<dyn Transport>, settings: CommunicatorSettings) -> Self {
        Self {
            transport,
            settings,
            proxy_set: false,
            proxy_reported: AtomicBool::new(false),
        }
    }

    /// Tell the communicator whether a network proxy is configured
    ///
    /// When set, the first connection failure adds a proxy advisory.
    #[must_use]
    pub fn with_proxy_set(mut self, proxy_set: bool) -> Self {
        self.proxy_set = proxy_set;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &CommunicatorSettings {
        &self.settings
    }

    /// Send `request` to `target`, trying its addresses in order
    #[instrument(
        skip(self, target, request),
        fields(node = %target.label(), action = %request.action()),
        level = "debug"
    )]
    pub async fn call(&self, target: &Target, request: &RequestData) -> Exchange {
        let deadline = self.settings.target_timeout.map(|limit| Instant::now() + limit);
        let mut reports = Vec::new();
        let mut cursor = AddressCursor::start();
        let mut last_address: Option<NodeAddress> = None;
        let mut failure = (ErrorKind::NotConnected, String::from("no address attempted"));

        while let Some((address, next)) = target.next_address(cursor) {
            let Some(timeout) = self.attempt_timeout(deadline) else {
                failure = (
                    ErrorKind::TimedOut,
                    String::from("Time limit for the node exceeded"),
                );
                break;
            };
            let url = address.url_for(request.action());
            last_address = Some(address.clone());

            reports.push(ReportItem::debug(ReportMessage::NodeCommunicationStarted {
                target: url.clone(),
                data: request.encoded(),
            }));

            match self.transport.send(address, request, timeout).await {
                Ok(response) => {
                    reports.push(ReportItem::debug(ReportMessage::NodeCommunicationFinished {
                        target: url,
                        response_code: response.status,
                        response_data: response.body.clone(),
                    }));
                    let outcome = match ErrorKind::from_status(response.status, &response.body) {
                        None => Outcome::Success {
                            status: response.status,
                            body: response.body,
                        },
                        Some((kind, reason)) => Outcome::Failure { kind, reason },
                    };
                    return Exchange {
                        result: CommunicationResult {
                            target: target.label().to_string(),
                            address: last_address,
                            outcome,
                        },
                        reports,
                    };
                }
                Err(err) if err.is_connection_level() => {
                    debug!(address = %address, error = %err, "unable to connect");
                    reports.push(ReportItem::debug(
                        ReportMessage::NodeCommunicationNotConnected {
                            node: address.host.clone(),
                            reason: err.to_string(),
                        },
                    ));
                    self.push_proxy_advisory(target, address, &mut reports);

                    let kind = match err {
                        TransportError::TimedOut(_) => ErrorKind::TimedOut,
                        _ => ErrorKind::NotConnected,
                    };
                    failure = (kind, err.to_string());

                    match target.next_address(next) {
                        Some((next_address, _)) => {
                            reports.push(ReportItem::info(
                                ReportMessage::NodeCommunicationRetrying {
                                    node: target.label().to_string(),
                                    failed_address: address.to_string(),
                                    next_address: next_address.to_string(),
                                    request: url,
                                },
                            ));
                        }
                        None => {
                            warn!(node = %target.label(), "no more addresses to try");
                            reports.push(ReportItem::warning(
                                ReportMessage::NodeCommunicationNoMoreAddresses {
                                    node: target.label().to_string(),
                                    request: url,
                                },
                            ));
                        }
                    }
                    cursor = next;
                }
                Err(err) => {
                    debug!(address = %address, error = %err, "request interrupted");
                    failure = (ErrorKind::Other, err.to_string());
                    break;
                }
            }
        }

        let (kind, reason) = failure;
        Exchange {
            result: CommunicationResult {
                target: target.label().to_string(),
                address: last_address,
                outcome: Outcome::Failure { kind, reason },
            },
            reports,
        }
    }

    /// Timeout for the next attempt, `None` once the target deadline passed
    fn attempt_timeout(&self, deadline: Option<Instant>) -> Option<Duration> {
        let Some(deadline) = deadline else {
            return Some(self.settings.request_timeout);
        };
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return None;
        }
        Some(left.min(self.settings.request_timeout))
    }

    fn push_proxy_advisory(
        &self,
        target: &Target,
        address: &NodeAddress,
        reports: &mut Vec<ReportItem>,
    ) {
        if self.proxy_set && !self.proxy_reported.swap(true, Ordering::Relaxed) {
            reports.push(ReportItem::warning(
                ReportMessage::NodeCommunicationProxyIsSet {
                    node: target.label().to_string(),
                    address: address.to_string(),
                },
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use hacluster_report::{ReportCode, Severity};

    use super::*;
    use crate::mock::MockTransport;

    fn codes(reports: &[ReportItem]) -> Vec<ReportCode> {
        reports.iter().map(ReportItem::code).collect()
    }

    fn communicator(transport: &Arc<MockTransport>) -> NodeCommunicator {
        NodeCommunicator::new(transport.clone(), CommunicatorSettings::default())
    }

    #[tokio::test]
    async fn test_call_success_first_address() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("10.0.0.1", "remote/status", 200, "ok");
        let target = Target::from_hosts("node1", &["10.0.0.1", "10.0.1.1"], 2224).unwrap();

        let exchange = communicator(&transport)
            .call(&target, &RequestData::new("remote/status"))
            .await;

        assert!(exchange.result.succeeded());
        assert_eq!(exchange.result.body(), Some("ok"));
        assert_eq!(
            codes(&exchange.reports),
            vec![
                ReportCode::NodeCommunicationStarted,
                ReportCode::NodeCommunicationFinished,
            ]
        );
        assert!(exchange.reports.iter().all(|r| r.severity == Severity::Debug));
    }

    #[tokio::test]
    async fn test_call_falls_back_to_next_address() {
        let transport = Arc::new(MockTransport::new());
        transport.unreachable("10.0.0.1", "remote/status");
        transport.unreachable("10.0.1.1", "remote/status");
        transport.respond("10.0.2.1", "remote/status", 200, "ok");
        let target =
            Target::from_hosts("node1", &["10.0.0.1", "10.0.1.1", "10.0.2.1"], 2224).unwrap();

        let exchange = communicator(&transport)
            .call(&target, &RequestData::new("remote/status"))
            .await;

        assert!(exchange.result.succeeded());
        assert_eq!(exchange.result.address.as_ref().map(|a| a.host.as_str()), Some("10.0.2.1"));
        let retries: Vec<_> = exchange
            .reports
            .iter()
            .filter(|r| r.code() == ReportCode::NodeCommunicationRetrying)
            .collect();
        assert_eq!(retries.len(), 2);
        assert!(retries.iter().all(|r| r.severity == Severity::Info));
    }

    #[tokio::test]
    async fn test_call_all_addresses_fail() {
        let transport = Arc::new(MockTransport::new());
        transport.unreachable("10.0.0.1", "remote/status");
        transport.timeout("10.0.1.1", "remote/status");
        let target = Target::from_hosts("node1", &["10.0.0.1", "10.0.1.1"], 2224).unwrap();

        let exchange = communicator(&transport)
            .call(&target, &RequestData::new("remote/status"))
            .await;

        assert_eq!(exchange.result.error_kind(), Some(ErrorKind::TimedOut));
        assert_eq!(
            codes(&exchange.reports),
            vec![
                ReportCode::NodeCommunicationStarted,
                ReportCode::NodeCommunicationNotConnected,
                ReportCode::NodeCommunicationRetrying,
                ReportCode::NodeCommunicationStarted,
                ReportCode::NodeCommunicationNotConnected,
                ReportCode::NodeCommunicationNoMoreAddresses,
            ]
        );
        assert_eq!(exchange.reports[5].severity, Severity::Warning);
    }

    #[tokio::test]
    async fn test_call_http_error_is_not_retried() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("10.0.0.1", "remote/status", 401, "");
        let target = Target::from_hosts("node1", &["10.0.0.1", "10.0.1.1"], 2224).unwrap();

        let exchange = communicator(&transport)
            .call(&target, &RequestData::new("remote/status"))
            .await;

        assert_eq!(exchange.result.error_kind(), Some(ErrorKind::NotAuthorized));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_call_interrupted_response_is_not_retried() {
        let transport = Arc::new(MockTransport::new());
        transport.interrupted("10.0.0.1", "remote/status", "connection reset");
        let target = Target::from_hosts("node1", &["10.0.0.1", "10.0.1.1"], 2224).unwrap();

        let exchange = communicator(&transport)
            .call(&target, &RequestData::new("remote/status"))
            .await;

        assert_eq!(exchange.result.error_kind(), Some(ErrorKind::Other));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_proxy_advisory_reported_once() {
        let transport = Arc::new(MockTransport::new());
        transport.unreachable("node1", "remote/status");
        transport.unreachable("node2", "remote/status");
        let communicator = communicator(&transport).with_proxy_set(true);

        let first = communicator
            .call(
                &Target::from_hosts("node1", &["node1"], 2224).unwrap(),
                &RequestData::new("remote/status"),
            )
            .await;
        let second = communicator
            .call(
                &Target::from_hosts("node2", &["node2"], 2224).unwrap(),
                &RequestData::new("remote/status"),
            )
            .await;

        let count = |reports: &[ReportItem]| {
            reports
                .iter()
                .filter(|r| r.code() == ReportCode::NodeCommunicationProxyIsSet)
                .count()
        };
        assert_eq!(count(&first.reports), 1);
        assert_eq!(count(&second.reports), 0);
    }

    #[tokio::test]
    async fn test_target_deadline_stops_fallback() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_after(
            "10.0.0.1",
            "remote/status",
            Duration::from_millis(50),
            200,
            "late",
        );
        transport.respond_after(
            "10.0.1.1",
            "remote/status",
            Duration::from_millis(50),
            200,
            "late",
        );
        let settings = CommunicatorSettings::default()
            .with_request_timeout(Duration::from_millis(20))
            .with_target_timeout(Duration::from_millis(30));
        let communicator = NodeCommunicator::new(transport.clone(), settings);
        let target = Target::from_hosts("node1", &["10.0.0.1", "10.0.1.1"], 2224).unwrap();

        let exchange = communicator
            .call(&target, &RequestData::new("remote/status"))
            .await;

        assert_eq!(exchange.result.error_kind(), Some(ErrorKind::TimedOut));
    }
}
