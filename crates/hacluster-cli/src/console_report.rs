//! Rendering of library reports for the terminal

use hacluster_report::{ForceCode, ReportItem, ReportMessage, Severity};

fn service_name(service: &str, instance: &Option<String>) -> String {
    match instance {
        Some(instance) => format!("{service}@{instance}"),
        None => service.to_string(),
    }
}

fn node_prefix(node: &Option<String>) -> String {
    match node {
        Some(node) => format!("{node}: "),
        None => String::new(),
    }
}

/// Human readable text of a report message
#[must_use]
pub fn message_text(message: &ReportMessage) -> String {
    use ReportMessage as M;

    match message {
        M::NodeCommunicationStarted { target, data } => {
            format!("Sending HTTP Request to: {target}\n{data}")
        }
        M::NodeCommunicationFinished {
            target,
            response_code,
            response_data,
        } => format!(
            "Finished calling: {target}\nResponse Code: {response_code}\n\
             --Debug Response Start--\n{response_data}\n--Debug Response End--"
        ),
        M::NodeCommunicationNotConnected { node, reason } => {
            format!("Unable to connect to {node} ({reason})")
        }
        M::NodeCommunicationRetrying {
            node,
            failed_address,
            next_address,
            request,
        } => format!(
            "Unable to connect to '{node}' via address '{failed_address}'. \
             Retrying request '{request}' via address '{next_address}'"
        ),
        M::NodeCommunicationNoMoreAddresses { node, request } => {
            format!("Unable to connect to '{node}' via any of its addresses, request '{request}'")
        }
        M::NodeCommunicationProxyIsSet { .. } => {
            "Proxy is set in environment variables, try disabling it".to_string()
        }
        M::NodeCommunicationErrorNotAuthorized { node, reason, .. } => {
            format!("Unable to authenticate to {node} ({reason})")
        }
        M::NodeCommunicationErrorPermissionDenied { node, reason, .. } => {
            format!("{node}: Permission denied ({reason})")
        }
        M::NodeCommunicationErrorUnsupportedCommand { node, reason, .. } => {
            format!("{node}: Unsupported command ({reason}), try upgrading the node agent")
        }
        M::NodeCommunicationCommandUnsuccessful { node, reason, .. } => format!("{node}: {reason}"),
        M::NodeCommunicationError { node, reason, .. } => {
            format!("Error connecting to {node} ({reason})")
        }
        M::NodeCommunicationErrorUnableToConnect { node, reason, .. } => {
            format!("Unable to connect to {node} ({reason})")
        }
        M::NodeCommunicationErrorTimedOut { node, reason, .. } => {
            format!("{node}: Connection timeout ({reason})")
        }
        M::UnableToPerformOperationOnAnyNode => {
            "Unable to perform operation on any available node/host, therefore it is not \
             possible to continue"
                .to_string()
        }
        M::InvalidResponseFormat { node } => format!("{node}: Invalid format of response"),

        M::CorosyncNotRunningCheckStarted => {
            "Checking corosync is not running on nodes...".to_string()
        }
        M::CorosyncNotRunningCheckNodeError { node } => {
            format!("{node}: Unable to check if corosync is not running")
        }
        M::CorosyncNotRunningOnNode { node } => format!("{node}: corosync is not running"),
        M::CorosyncRunningOnNode { node } => format!("{node}: corosync is running"),
        M::CorosyncConfigDistributionStarted => {
            "Sending updated corosync.conf to nodes...".to_string()
        }
        M::CorosyncConfigAcceptedByNode { node } => format!("{node}: Succeeded"),
        M::CorosyncConfigDistributionNodeError { node } => {
            format!("{node}: Unable to set corosync config")
        }
        M::CorosyncConfigReloaded => "Corosync configuration reloaded".to_string(),
        M::CorosyncConfigReloadError { reason } => {
            format!("Unable to reload corosync configuration: {reason}")
        }
        M::QdeviceClientReloadStarted => {
            "Reloading qdevice configuration on nodes...".to_string()
        }

        M::QdeviceCertificateDistributionStarted => {
            "Setting up qdevice certificates on nodes...".to_string()
        }
        M::QdeviceCertificateAcceptedByNode { node } => format!("{node}: Succeeded"),
        M::QdeviceCertificateImportError { reason } => {
            format!("Unable to import quorum device certificate: {reason}")
        }
        M::QdeviceInitializationError { model, reason } => {
            format!("Unable to initialize quorum device '{model}': {reason}")
        }
        M::QdeviceNotInitialized { model } => {
            format!("Quorum device '{model}' has not been initialized yet")
        }

        M::ServiceStartStarted { service, instance } => {
            format!("Starting {}...", service_name(service, instance))
        }
        M::ServiceStartSuccess {
            service,
            node,
            instance,
        } => format!("{}{} started", node_prefix(node), service_name(service, instance)),
        M::ServiceStartSkipped {
            service,
            reason,
            node,
            instance,
        } => format!(
            "{}not starting {} - {reason}",
            node_prefix(node),
            service_name(service, instance)
        ),
        M::ServiceStopStarted { service, instance } => {
            format!("Stopping {}...", service_name(service, instance))
        }
        M::ServiceStopSuccess {
            service,
            node,
            instance,
        } => format!("{}{} stopped", node_prefix(node), service_name(service, instance)),
        M::ServiceEnableStarted { service, instance } => {
            format!("Enabling {}...", service_name(service, instance))
        }
        M::ServiceEnableSuccess {
            service,
            node,
            instance,
        } => format!("{}{} enabled", node_prefix(node), service_name(service, instance)),
        M::ServiceEnableSkipped {
            service,
            reason,
            node,
            instance,
        } => format!(
            "{}not enabling {} - {reason}",
            node_prefix(node),
            service_name(service, instance)
        ),
        M::ServiceDisableStarted { service, instance } => {
            format!("Disabling {}...", service_name(service, instance))
        }
        M::ServiceDisableSuccess {
            service,
            node,
            instance,
        } => format!("{}{} disabled", node_prefix(node), service_name(service, instance)),

        M::BoothConfigDistributionStarted => {
            "Sending booth configuration to cluster nodes...".to_string()
        }
        M::BoothConfigAcceptedByNode { node, name_list } => {
            let names = name_list.join(", ");
            if name_list.len() > 1 {
                format!("{}Booth configs '{names}' saved", node_prefix(node))
            } else {
                format!("{}Booth config '{names}' saved", node_prefix(node))
            }
        }
        M::BoothConfigDistributionNodeError { node, reason, name } => match name {
            Some(name) => {
                format!("Unable to save booth config '{name}' on node '{node}': {reason}")
            }
            None => format!("Unable to save booth config on node '{node}': {reason}"),
        },
        M::BoothFetchingConfigFromNode { node, config } => match config {
            Some(config) => format!("Fetching booth config '{config}' from node '{node}'..."),
            None => format!("Fetching booth config from node '{node}'..."),
        },

        M::RunExternalProcessStarted { command, stdin } => match stdin {
            Some(stdin) => format!(
                "Running: {command}\n--Debug Input Start--\n{stdin}\n--Debug Input End--"
            ),
            None => format!("Running: {command}"),
        },
        M::RunExternalProcessFinished {
            command,
            return_value,
            stdout,
            stderr,
        } => format!(
            "Finished running: {command}\nReturn value: {return_value}\n\
             --Debug Stdout Start--\n{stdout}\n--Debug Stdout End--\n\
             --Debug Stderr Start--\n{stderr}\n--Debug Stderr End--"
        ),
    }
}

/// Command line flag overriding a force category
fn force_flag(code: ForceCode) -> &'static str {
    match code {
        ForceCode::SkipOfflineNodes => "--skip-offline",
        ForceCode::Force => "--force",
    }
}

/// Full line for one report, including severity prefix and override hint
#[must_use]
pub fn render(item: &ReportItem) -> String {
    let text = message_text(&item.message);
    match item.severity {
        Severity::Error => match item.forceable {
            Some(code) => format!("Error: {text}, use {} to override", force_flag(code)),
            None => format!("Error: {text}"),
        },
        Severity::Warning => format!("Warning: {text}"),
        Severity::Info => text,
        Severity::Debug => format!("Debug: {text}"),
    }
}

/// Print reports in insertion order; errors and warnings go to stderr
pub fn print_reports(items: &[ReportItem], debug: bool) {
    for item in items {
        match item.severity {
            Severity::Debug if !debug => {}
            Severity::Error | Severity::Warning => eprintln!("{}", render(item)),
            Severity::Info | Severity::Debug => println!("{}", render(item)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forceable_error_hint() {
        let item = ReportItem::forceable_error(
            ForceCode::SkipOfflineNodes,
            ReportMessage::NodeCommunicationCommandUnsuccessful {
                node: "rh7-2".to_string(),
                command: "remote/set_corosync_conf".to_string(),
                reason: "Failed".to_string(),
            },
        );
        assert_eq!(
            render(&item),
            "Error: rh7-2: Failed, use --skip-offline to override"
        );
    }

    #[test]
    fn test_severity_prefixes() {
        let message = ReportMessage::CorosyncConfigDistributionNodeError {
            node: "rh7-2".to_string(),
        };
        assert_eq!(
            render(&ReportItem::error(message.clone())),
            "Error: rh7-2: Unable to set corosync config"
        );
        assert_eq!(
            render(&ReportItem::warning(message)),
            "Warning: rh7-2: Unable to set corosync config"
        );
        assert_eq!(
            render(&ReportItem::info(ReportMessage::CorosyncConfigReloaded)),
            "Corosync configuration reloaded"
        );
    }

    #[test]
    fn test_service_messages() {
        let message = ReportMessage::ServiceStartSkipped {
            service: "corosync-qdevice".to_string(),
            reason: "corosync is not running".to_string(),
            node: Some("node2".to_string()),
            instance: None,
        };
        assert_eq!(
            message_text(&message),
            "node2: not starting corosync-qdevice - corosync is not running"
        );

        let message = ReportMessage::ServiceEnableStarted {
            service: "booth".to_string(),
            instance: Some("arbitrator".to_string()),
        };
        assert_eq!(message_text(&message), "Enabling booth@arbitrator...");
    }

    #[test]
    fn test_booth_messages() {
        let message = ReportMessage::BoothConfigAcceptedByNode {
            node: None,
            name_list: vec!["booth".to_string()],
        };
        assert_eq!(message_text(&message), "Booth config 'booth' saved");

        let message = ReportMessage::BoothConfigDistributionNodeError {
            node: "node1".to_string(),
            reason: "Permission denied".to_string(),
            name: Some("booth.conf".to_string()),
        };
        assert_eq!(
            message_text(&message),
            "Unable to save booth config 'booth.conf' on node 'node1': Permission denied"
        );
    }
}
