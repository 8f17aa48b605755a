#![allow(dead_code)]

use std::sync::Arc;

use hacluster_comm::mock::MockTransport;
use hacluster_comm::{CommunicatorSettings, NodeCommunicator};
use hacluster_core::{ClusterConfig, LibraryEnvironment, NodeConfig};
use hacluster_exec::CommandRunner;
use hacluster_report::{ForceCode, ReportCode, ReportItem, Severity};

pub const SET_CONF: &str = "remote/set_corosync_conf";
pub const STATUS: &str = "remote/status";
pub const SYSTEMCTL_IS_ACTIVE: [&str; 3] = ["/bin/systemctl", "is-active", "corosync.service"];
pub const CFGTOOL_RELOAD: [&str; 2] = ["/usr/sbin/corosync-cfgtool", "-R"];

pub fn cluster(nodes: &[&str]) -> ClusterConfig {
    ClusterConfig {
        name: "cluster".to_string(),
        nodes: nodes.iter().map(|node| NodeConfig::new(*node)).collect(),
    }
}

/// Environment over `nodes` contacting one node at a time
pub fn environment(
    nodes: &[&str],
    transport: &Arc<MockTransport>,
    runner: Arc<dyn CommandRunner>,
) -> LibraryEnvironment {
    let communicator = NodeCommunicator::new(
        transport.clone(),
        CommunicatorSettings::default().with_max_concurrency(1),
    )
    .with_proxy_set(false);
    LibraryEnvironment::new(&cluster(nodes), 2224, communicator, runner).unwrap()
}

/// Non-debug reports as (code, severity, forceable, node)
pub fn visible(
    reports: &[ReportItem],
) -> Vec<(ReportCode, Severity, Option<ForceCode>, Option<String>)> {
    reports
        .iter()
        .filter(|item| item.severity != Severity::Debug)
        .map(|item| {
            (
                item.code(),
                item.severity,
                item.forceable,
                item.message.node().map(str::to_string),
            )
        })
        .collect()
}

pub fn codes(reports: &[ReportItem]) -> Vec<ReportCode> {
    reports
        .iter()
        .filter(|item| item.severity != Severity::Debug)
        .map(ReportItem::code)
        .collect()
}
