//! Corosync state probe and configuration distribution

use serde_json::Value;

use hacluster_comm::{NodeVerdict, RemoteAction, RequestData, ResponseContext};
use hacluster_report::{Problem, ReportItem, ReportMessage};

/// Ask each node whether corosync is running; accepted when it is not
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckCorosyncOffline;

impl RemoteAction for CheckCorosyncOffline {
    type Output = ();

    fn request(&self) -> RequestData {
        RequestData::new("remote/status").with_param("version", "2")
    }

    fn started(&self) -> Vec<ReportItem> {
        vec![ReportItem::info(
            ReportMessage::CorosyncNotRunningCheckStarted,
        )]
    }

    fn on_success(&self, ctx: &ResponseContext<'_>, body: &str) -> NodeVerdict<()> {
        let node = ctx.node.to_string();
        match corosync_running(body) {
            Some(false) => NodeVerdict::accepted_with(
                (),
                ReportItem::info(ReportMessage::CorosyncNotRunningOnNode { node }),
            ),
            // a running node is a real precondition violation, never skippable
            Some(true) => {
                NodeVerdict::rejected(ReportItem::error(ReportMessage::CorosyncRunningOnNode {
                    node,
                }))
            }
            None => NodeVerdict::rejected(ReportItem::from_problem(
                ctx.offline_problem(),
                ReportMessage::CorosyncNotRunningCheckNodeError { node },
            )),
        }
    }

    fn on_failure(
        &self,
        ctx: &ResponseContext<'_>,
        _reason: &str,
        problem: Problem,
    ) -> Vec<ReportItem> {
        vec![ReportItem::from_problem(
            problem,
            ReportMessage::CorosyncNotRunningCheckNodeError {
                node: ctx.node.to_string(),
            },
        )]
    }
}

/// Running flag from either status response shape
fn corosync_running(body: &str) -> Option<bool> {
    let status: Value = serde_json::from_str(body).ok()?;
    status
        .pointer("/services/corosync/running")
        .or_else(|| status.get("corosync"))
        .and_then(Value::as_bool)
}

/// Send a new corosync configuration to each node
#[derive(Debug, Clone)]
pub struct DistributeCorosyncConf {
    pub config_text: String,
}

impl DistributeCorosyncConf {
    pub fn new(config_text: impl Into<String>) -> Self {
        Self {
            config_text: config_text.into(),
        }
    }
}

impl RemoteAction for DistributeCorosyncConf {
    type Output = ();

    fn request(&self) -> RequestData {
        RequestData::new("remote/set_corosync_conf")
            .with_param("corosync_conf", self.config_text.as_str())
    }

    fn started(&self) -> Vec<ReportItem> {
        vec![ReportItem::info(
            ReportMessage::CorosyncConfigDistributionStarted,
        )]
    }

    fn on_success(&self, ctx: &ResponseContext<'_>, _body: &str) -> NodeVerdict<()> {
        NodeVerdict::accepted_with(
            (),
            ReportItem::info(ReportMessage::CorosyncConfigAcceptedByNode {
                node: ctx.node.to_string(),
            }),
        )
    }

    fn on_failure(
        &self,
        ctx: &ResponseContext<'_>,
        _reason: &str,
        problem: Problem,
    ) -> Vec<ReportItem> {
        vec![ReportItem::from_problem(
            problem,
            ReportMessage::CorosyncConfigDistributionNodeError {
                node: ctx.node.to_string(),
            },
        )]
    }
}

#[cfg(test)]
mod tests {
    use hacluster_report::{ForceCode, ReportCode, Severity};

    use super::*;

    fn ctx(skip: bool) -> ResponseContext<'static> {
        ResponseContext {
            node: "node1",
            skip_offline_nodes: skip,
        }
    }

    #[test]
    fn test_corosync_running_shapes() {
        assert_eq!(corosync_running(r#"{"corosync": false}"#), Some(false));
        assert_eq!(corosync_running(r#"{"corosync": true}"#), Some(true));
        assert_eq!(
            corosync_running(r#"{"services": {"corosync": {"running": true}}}"#),
            Some(true)
        );
        assert_eq!(corosync_running(r#"{"pacemaker": true}"#), None);
        assert_eq!(corosync_running("not json"), None);
    }

    #[test]
    fn test_running_node_is_unforceable() {
        match CheckCorosyncOffline.on_success(&ctx(true), r#"{"corosync": true}"#) {
            NodeVerdict::Rejected { reports } => {
                assert_eq!(reports[0].code(), ReportCode::CorosyncRunningOnNode);
                assert_eq!(reports[0].severity, Severity::Error);
                assert_eq!(reports[0].forceable, None);
            }
            NodeVerdict::Accepted { .. } => panic!("running node accepted"),
        }
    }

    #[test]
    fn test_unreadable_status_follows_skip_policy() {
        match CheckCorosyncOffline.on_success(&ctx(false), "{}") {
            NodeVerdict::Rejected { reports } => {
                assert_eq!(reports[0].code(), ReportCode::CorosyncNotRunningCheckNodeError);
                assert_eq!(reports[0].forceable, Some(ForceCode::SkipOfflineNodes));
            }
            NodeVerdict::Accepted { .. } => panic!("unreadable status accepted"),
        }
    }
}
