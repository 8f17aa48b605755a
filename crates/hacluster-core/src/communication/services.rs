//! Quorum device client service control on nodes

use hacluster_comm::{NodeVerdict, RemoteAction, RequestData, ResponseContext};
use hacluster_report::{ReportItem, ReportMessage, ServiceAction};

/// Service name of the quorum device client
pub const QDEVICE_SERVICE: &str = "corosync-qdevice";

/// Start, stop, enable or disable the quorum device client on each node
#[derive(Debug, Clone, Copy)]
pub struct QdeviceClientService {
    action: ServiceAction,
    announce: bool,
}

impl QdeviceClientService {
    pub fn new(action: ServiceAction) -> Self {
        Self {
            action,
            announce: false,
        }
    }

    /// Record a `SERVICE_<ACTION>_STARTED` report before contacting nodes
    #[must_use]
    pub fn announced(mut self) -> Self {
        self.announce = true;
        self
    }

    /// Reason the node agent gave for skipping the action, if it did
    fn skip_reason(&self, body: &str) -> Option<&'static str> {
        match (self.action, body.trim()) {
            (ServiceAction::Start, "corosync is not running, skipping") => {
                Some("corosync is not running")
            }
            (ServiceAction::Enable, "corosync is not enabled, skipping") => {
                Some("corosync is not enabled")
            }
            _ => None,
        }
    }
}

impl RemoteAction for QdeviceClientService {
    type Output = ();

    fn request(&self) -> RequestData {
        RequestData::new(format!("remote/qdevice_client_{}", self.action))
    }

    fn started(&self) -> Vec<ReportItem> {
        if !self.announce {
            return Vec::new();
        }
        vec![ReportItem::info(ReportMessage::service_started(
            self.action,
            QDEVICE_SERVICE,
            None,
        ))]
    }

    fn on_success(&self, ctx: &ResponseContext<'_>, body: &str) -> NodeVerdict<()> {
        let skipped = self.skip_reason(body).and_then(|reason| {
            ReportMessage::service_skipped(self.action, QDEVICE_SERVICE, reason, Some(ctx.node), None)
        });
        let message = skipped.unwrap_or_else(|| {
            ReportMessage::service_success(self.action, QDEVICE_SERVICE, Some(ctx.node), None)
        });
        NodeVerdict::accepted_with((), ReportItem::info(message))
    }
}

#[cfg(test)]
mod tests {
    use hacluster_report::ReportCode;

    use super::*;

    fn reported_code(action: ServiceAction, body: &str) -> ReportCode {
        let ctx = ResponseContext {
            node: "node1",
            skip_offline_nodes: false,
        };
        match QdeviceClientService::new(action).on_success(&ctx, body) {
            NodeVerdict::Accepted { reports, .. } => reports[0].code(),
            NodeVerdict::Rejected { .. } => panic!("service response rejected"),
        }
    }

    #[test]
    fn test_request_paths() {
        assert_eq!(
            QdeviceClientService::new(ServiceAction::Stop).request().action(),
            "remote/qdevice_client_stop"
        );
        assert_eq!(
            QdeviceClientService::new(ServiceAction::Enable).request().action(),
            "remote/qdevice_client_enable"
        );
    }

    #[test]
    fn test_skipped_responses() {
        assert_eq!(
            reported_code(ServiceAction::Start, "corosync is not running, skipping"),
            ReportCode::ServiceStartSkipped
        );
        assert_eq!(
            reported_code(ServiceAction::Enable, "corosync is not enabled, skipping\n"),
            ReportCode::ServiceEnableSkipped
        );
        assert_eq!(
            reported_code(ServiceAction::Start, "corosync-qdevice started"),
            ReportCode::ServiceStartSuccess
        );
        assert_eq!(
            reported_code(ServiceAction::Stop, "corosync is not running, skipping"),
            ReportCode::ServiceStopSuccess
        );
    }

    #[test]
    fn test_announce() {
        assert!(QdeviceClientService::new(ServiceAction::Start).started().is_empty());
        let started = QdeviceClientService::new(ServiceAction::Start)
            .announced()
            .started();
        assert_eq!(started[0].code(), ReportCode::ServiceStartStarted);
    }
}
