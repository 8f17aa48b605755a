//! Severity policy for per-node failures

use hacluster_report::{ForceCode, Problem, ReportItem, ReportMessage};

use crate::response::{ErrorClass, ErrorKind};

/// Decide how bad a failed request to one node is
///
/// Both classes escalate the same way so that `skip_offline_nodes` also
/// pushes through nodes that are reachable but mis-provisioned.
#[must_use]
pub fn classify(kind: ErrorKind, skip_offline_nodes: bool) -> Problem {
    match kind.class() {
        ErrorClass::Connectivity | ErrorClass::Command => {
            Problem::for_force(ForceCode::SkipOfflineNodes, skip_offline_nodes)
        }
    }
}

/// Report describing a failed request, tagged with the code for its kind
#[must_use]
pub fn failure_report(
    node: &str,
    command: &str,
    kind: ErrorKind,
    reason: &str,
    problem: Problem,
) -> ReportItem {
    let node = node.to_string();
    let command = command.to_string();
    let reason = reason.to_string();
    let message = match kind {
        ErrorKind::NotConnected => ReportMessage::NodeCommunicationErrorUnableToConnect {
            node,
            command,
            reason,
        },
        ErrorKind::TimedOut => ReportMessage::NodeCommunicationErrorTimedOut {
            node,
            command,
            reason,
        },
        ErrorKind::NotAuthorized => ReportMessage::NodeCommunicationErrorNotAuthorized {
            node,
            command,
            reason,
        },
        ErrorKind::PermissionDenied => ReportMessage::NodeCommunicationErrorPermissionDenied {
            node,
            command,
            reason,
        },
        ErrorKind::UnsupportedCommand => ReportMessage::NodeCommunicationErrorUnsupportedCommand {
            node,
            command,
            reason,
        },
        ErrorKind::CommandUnsuccessful => ReportMessage::NodeCommunicationCommandUnsuccessful {
            node,
            command,
            reason,
        },
        ErrorKind::Other => ReportMessage::NodeCommunicationError {
            node,
            command,
            reason,
        },
    };
    ReportItem::from_problem(problem, message)
}
