//! Closed set of report payloads
//!
//! Each variant of [`ReportMessage`] is one event kind together with the
//! structured data describing it. [`ReportCode`] names the kind without the
//! payload and is what tests and callers usually match on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Action performed on a system service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Start,
    Stop,
    Enable,
    Disable,
}

impl ServiceAction {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Enable => "enable",
            ServiceAction::Disable => "disable",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event kind plus its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "code",
    content = "info",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum ReportMessage {
    // ========================================================================
    // Node communication
    // ========================================================================
    /// Request is about to be sent
    NodeCommunicationStarted { target: String, data: String },
    /// Response arrived
    NodeCommunicationFinished {
        target: String,
        response_code: u16,
        response_data: String,
    },
    /// One address of a node could not be reached
    NodeCommunicationNotConnected { node: String, reason: String },
    /// Request is repeated on the next address of the node
    NodeCommunicationRetrying {
        node: String,
        failed_address: String,
        next_address: String,
        request: String,
    },
    /// Every address of the node has been tried
    NodeCommunicationNoMoreAddresses { node: String, request: String },
    /// A network proxy is configured in the environment
    NodeCommunicationProxyIsSet { node: String, address: String },
    NodeCommunicationErrorNotAuthorized {
        node: String,
        command: String,
        reason: String,
    },
    NodeCommunicationErrorPermissionDenied {
        node: String,
        command: String,
        reason: String,
    },
    NodeCommunicationErrorUnsupportedCommand {
        node: String,
        command: String,
        reason: String,
    },
    NodeCommunicationCommandUnsuccessful {
        node: String,
        command: String,
        reason: String,
    },
    NodeCommunicationError {
        node: String,
        command: String,
        reason: String,
    },
    NodeCommunicationErrorUnableToConnect {
        node: String,
        command: String,
        reason: String,
    },
    NodeCommunicationErrorTimedOut {
        node: String,
        command: String,
        reason: String,
    },
    /// No target of a first-success command succeeded
    UnableToPerformOperationOnAnyNode,
    /// Node answered with something that cannot be understood
    InvalidResponseFormat { node: String },

    // ========================================================================
    // Corosync
    // ========================================================================
    CorosyncNotRunningCheckStarted,
    CorosyncNotRunningCheckNodeError { node: String },
    CorosyncNotRunningOnNode { node: String },
    CorosyncRunningOnNode { node: String },
    CorosyncConfigDistributionStarted,
    CorosyncConfigAcceptedByNode { node: String },
    CorosyncConfigDistributionNodeError { node: String },
    CorosyncConfigReloaded,
    CorosyncConfigReloadError { reason: String },
    QdeviceClientReloadStarted,

    // ========================================================================
    // Quorum device
    // ========================================================================
    QdeviceCertificateDistributionStarted,
    QdeviceCertificateAcceptedByNode { node: String },
    QdeviceCertificateImportError { reason: String },
    QdeviceInitializationError { model: String, reason: String },
    QdeviceNotInitialized { model: String },

    // ========================================================================
    // Services
    // ========================================================================
    ServiceStartStarted {
        service: String,
        instance: Option<String>,
    },
    ServiceStartSuccess {
        service: String,
        node: Option<String>,
        instance: Option<String>,
    },
    ServiceStartSkipped {
        service: String,
        reason: String,
        node: Option<String>,
        instance: Option<String>,
    },
    ServiceStopStarted {
        service: String,
        instance: Option<String>,
    },
    ServiceStopSuccess {
        service: String,
        node: Option<String>,
        instance: Option<String>,
    },
    ServiceEnableStarted {
        service: String,
        instance: Option<String>,
    },
    ServiceEnableSuccess {
        service: String,
        node: Option<String>,
        instance: Option<String>,
    },
    ServiceEnableSkipped {
        service: String,
        reason: String,
        node: Option<String>,
        instance: Option<String>,
    },
    ServiceDisableStarted {
        service: String,
        instance: Option<String>,
    },
    ServiceDisableSuccess {
        service: String,
        node: Option<String>,
        instance: Option<String>,
    },

    // ========================================================================
    // Booth
    // ========================================================================
    BoothConfigDistributionStarted,
    BoothConfigAcceptedByNode {
        node: Option<String>,
        name_list: Vec<String>,
    },
    BoothConfigDistributionNodeError {
        node: String,
        reason: String,
        name: Option<String>,
    },
    BoothFetchingConfigFromNode {
        node: String,
        config: Option<String>,
    },

    // ========================================================================
    // Local processes
    // ========================================================================
    RunExternalProcessStarted {
        command: String,
        stdin: Option<String>,
    },
    RunExternalProcessFinished {
        command: String,
        return_value: i32,
        stdout: String,
        stderr: String,
    },
}

impl ReportMessage {
    /// `SERVICE_<ACTION>_STARTED`
    #[must_use]
    pub fn service_started(action: ServiceAction, service: &str, instance: Option<&str>) -> Self {
        let service = service.to_string();
        let instance = instance.map(str::to_string);
        match action {
            ServiceAction::Start => Self::ServiceStartStarted { service, instance },
            ServiceAction::Stop => Self::ServiceStopStarted { service, instance },
            ServiceAction::Enable => Self::ServiceEnableStarted { service, instance },
            ServiceAction::Disable => Self::ServiceDisableStarted { service, instance },
        }
    }

    /// `SERVICE_<ACTION>_SUCCESS`
    #[must_use]
    pub fn service_success(
        action: ServiceAction,
        service: &str,
        node: Option<&str>,
        instance: Option<&str>,
    ) -> Self {
        let service = service.to_string();
        let node = node.map(str::to_string);
        let instance = instance.map(str::to_string);
        match action {
            ServiceAction::Start => Self::ServiceStartSuccess {
                service,
                node,
                instance,
            },
            ServiceAction::Stop => Self::ServiceStopSuccess {
                service,
                node,
                instance,
            },
            ServiceAction::Enable => Self::ServiceEnableSuccess {
                service,
                node,
                instance,
            },
            ServiceAction::Disable => Self::ServiceDisableSuccess {
                service,
                node,
                instance,
            },
        }
    }

    /// `SERVICE_<ACTION>_SKIPPED`, only start and enable can be skipped
    #[must_use]
    pub fn service_skipped(
        action: ServiceAction,
        service: &str,
        reason: &str,
        node: Option<&str>,
        instance: Option<&str>,
    ) -> Option<Self> {
        let service = service.to_string();
        let reason = reason.to_string();
        let node = node.map(str::to_string);
        let instance = instance.map(str::to_string);
        match action {
            ServiceAction::Start => Some(Self::ServiceStartSkipped {
                service,
                reason,
                node,
                instance,
            }),
            ServiceAction::Enable => Some(Self::ServiceEnableSkipped {
                service,
                reason,
                node,
                instance,
            }),
            ServiceAction::Stop | ServiceAction::Disable => None,
        }
    }

    /// Event kind without payload
    #[must_use]
    pub fn code(&self) -> ReportCode {
        match self {
            Self::NodeCommunicationStarted { .. } => ReportCode::NodeCommunicationStarted,
            Self::NodeCommunicationFinished { .. } => ReportCode::NodeCommunicationFinished,
            Self::NodeCommunicationNotConnected { .. } => ReportCode::NodeCommunicationNotConnected,
            Self::NodeCommunicationRetrying { .. } => ReportCode::NodeCommunicationRetrying,
            Self::NodeCommunicationNoMoreAddresses { .. } => {
                ReportCode::NodeCommunicationNoMoreAddresses
            }
            Self::NodeCommunicationProxyIsSet { .. } => ReportCode::NodeCommunicationProxyIsSet,
            Self::NodeCommunicationErrorNotAuthorized { .. } => {
                ReportCode::NodeCommunicationErrorNotAuthorized
            }
            Self::NodeCommunicationErrorPermissionDenied { .. } => {
                ReportCode::NodeCommunicationErrorPermissionDenied
            }
            Self::NodeCommunicationErrorUnsupportedCommand { .. } => {
                ReportCode::NodeCommunicationErrorUnsupportedCommand
            }
            Self::NodeCommunicationCommandUnsuccessful { .. } => {
                ReportCode::NodeCommunicationCommandUnsuccessful
            }
            Self::NodeCommunicationError { .. } => ReportCode::NodeCommunicationError,
            Self::NodeCommunicationErrorUnableToConnect { .. } => {
                ReportCode::NodeCommunicationErrorUnableToConnect
            }
            Self::NodeCommunicationErrorTimedOut { .. } => {
                ReportCode::NodeCommunicationErrorTimedOut
            }
            Self::UnableToPerformOperationOnAnyNode => {
                ReportCode::UnableToPerformOperationOnAnyNode
            }
            Self::InvalidResponseFormat { .. } => ReportCode::InvalidResponseFormat,
            Self::CorosyncNotRunningCheckStarted => ReportCode::CorosyncNotRunningCheckStarted,
            Self::CorosyncNotRunningCheckNodeError { .. } => {
                ReportCode::CorosyncNotRunningCheckNodeError
            }
            Self::CorosyncNotRunningOnNode { .. } => ReportCode::CorosyncNotRunningOnNode,
            Self::CorosyncRunningOnNode { .. } => ReportCode::CorosyncRunningOnNode,
            Self::CorosyncConfigDistributionStarted => {
                ReportCode::CorosyncConfigDistributionStarted
            }
            Self::CorosyncConfigAcceptedByNode { .. } => ReportCode::CorosyncConfigAcceptedByNode,
            Self::CorosyncConfigDistributionNodeError { .. } => {
                ReportCode::CorosyncConfigDistributionNodeError
            }
            Self::CorosyncConfigReloaded => ReportCode::CorosyncConfigReloaded,
            Self::CorosyncConfigReloadError { .. } => ReportCode::CorosyncConfigReloadError,
            Self::QdeviceClientReloadStarted => ReportCode::QdeviceClientReloadStarted,
            Self::QdeviceCertificateDistributionStarted => {
                ReportCode::QdeviceCertificateDistributionStarted
            }
            Self::QdeviceCertificateAcceptedByNode { .. } => {
                ReportCode::QdeviceCertificateAcceptedByNode
            }
            Self::QdeviceCertificateImportError { .. } => ReportCode::QdeviceCertificateImportError,
            Self::QdeviceInitializationError { .. } => ReportCode::QdeviceInitializationError,
            Self::QdeviceNotInitialized { .. } => ReportCode::QdeviceNotInitialized,
            Self::ServiceStartStarted { .. } => ReportCode::ServiceStartStarted,
            Self::ServiceStartSuccess { .. } => ReportCode::ServiceStartSuccess,
            Self::ServiceStartSkipped { .. } => ReportCode::ServiceStartSkipped,
            Self::ServiceStopStarted { .. } => ReportCode::ServiceStopStarted,
            Self::ServiceStopSuccess { .. } => ReportCode::ServiceStopSuccess,
            Self::ServiceEnableStarted { .. } => ReportCode::ServiceEnableStarted,
            Self::ServiceEnableSuccess { .. } => ReportCode::ServiceEnableSuccess,
            Self::ServiceEnableSkipped { .. } => ReportCode::ServiceEnableSkipped,
            Self::ServiceDisableStarted { .. } => ReportCode::ServiceDisableStarted,
            Self::ServiceDisableSuccess { .. } => ReportCode::ServiceDisableSuccess,
            Self::BoothConfigDistributionStarted => ReportCode::BoothConfigDistributionStarted,
            Self::BoothConfigAcceptedByNode { .. } => ReportCode::BoothConfigAcceptedByNode,
            Self::BoothConfigDistributionNodeError { .. } => {
                ReportCode::BoothConfigDistributionNodeError
            }
            Self::BoothFetchingConfigFromNode { .. } => ReportCode::BoothFetchingConfigFromNode,
            Self::RunExternalProcessStarted { .. } => ReportCode::RunExternalProcessStarted,
            Self::RunExternalProcessFinished { .. } => ReportCode::RunExternalProcessFinished,
        }
    }

    /// Node the event is about, if any
    #[must_use]
    pub fn node(&self) -> Option<&str> {
        match self {
            Self::NodeCommunicationNotConnected { node, .. }
            | Self::NodeCommunicationRetrying { node, .. }
            | Self::NodeCommunicationNoMoreAddresses { node, .. }
            | Self::NodeCommunicationProxyIsSet { node, .. }
            | Self::NodeCommunicationErrorNotAuthorized { node, .. }
            | Self::NodeCommunicationErrorPermissionDenied { node, .. }
            | Self::NodeCommunicationErrorUnsupportedCommand { node, .. }
            | Self::NodeCommunicationCommandUnsuccessful { node, .. }
            | Self::NodeCommunicationError { node, .. }
            | Self::NodeCommunicationErrorUnableToConnect { node, .. }
            | Self::NodeCommunicationErrorTimedOut { node, .. }
            | Self::InvalidResponseFormat { node }
            | Self::CorosyncNotRunningCheckNodeError { node }
            | Self::CorosyncNotRunningOnNode { node }
            | Self::CorosyncRunningOnNode { node }
            | Self::CorosyncConfigAcceptedByNode { node }
            | Self::CorosyncConfigDistributionNodeError { node }
            | Self::QdeviceCertificateAcceptedByNode { node }
            | Self::BoothConfigDistributionNodeError { node, .. }
            | Self::BoothFetchingConfigFromNode { node, .. } => Some(node),
            Self::ServiceStartSuccess { node, .. }
            | Self::ServiceStartSkipped { node, .. }
            | Self::ServiceStopSuccess { node, .. }
            | Self::ServiceEnableSuccess { node, .. }
            | Self::ServiceEnableSkipped { node, .. }
            | Self::ServiceDisableSuccess { node, .. }
            | Self::BoothConfigAcceptedByNode { node, .. } => node.as_deref(),
            _ => None,
        }
    }
}

/// Event kind identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportCode {
    NodeCommunicationStarted,
    NodeCommunicationFinished,
    NodeCommunicationNotConnected,
    NodeCommunicationRetrying,
    NodeCommunicationNoMoreAddresses,
    NodeCommunicationProxyIsSet,
    NodeCommunicationErrorNotAuthorized,
    NodeCommunicationErrorPermissionDenied,
    NodeCommunicationErrorUnsupportedCommand,
    NodeCommunicationCommandUnsuccessful,
    NodeCommunicationError,
    NodeCommunicationErrorUnableToConnect,
    NodeCommunicationErrorTimedOut,
    UnableToPerformOperationOnAnyNode,
    InvalidResponseFormat,
    CorosyncNotRunningCheckStarted,
    CorosyncNotRunningCheckNodeError,
    CorosyncNotRunningOnNode,
    CorosyncRunningOnNode,
    CorosyncConfigDistributionStarted,
    CorosyncConfigAcceptedByNode,
    CorosyncConfigDistributionNodeError,
    CorosyncConfigReloaded,
    CorosyncConfigReloadError,
    QdeviceClientReloadStarted,
    QdeviceCertificateDistributionStarted,
    QdeviceCertificateAcceptedByNode,
    QdeviceCertificateImportError,
    QdeviceInitializationError,
    QdeviceNotInitialized,
    ServiceStartStarted,
    ServiceStartSuccess,
    ServiceStartSkipped,
    ServiceStopStarted,
    ServiceStopSuccess,
    ServiceEnableStarted,
    ServiceEnableSuccess,
    ServiceEnableSkipped,
    ServiceDisableStarted,
    ServiceDisableSuccess,
    BoothConfigDistributionStarted,
    BoothConfigAcceptedByNode,
    BoothConfigDistributionNodeError,
    BoothFetchingConfigFromNode,
    RunExternalProcessStarted,
    RunExternalProcessFinished,
}

impl fmt::Display for ReportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug gives the CamelCase variant name; codes are SCREAMING_SNAKE_CASE
        let camel = format!("{self:?}");
        let mut out = String::with_capacity(camel.len() + 8);
        for (i, ch) in camel.chars().enumerate() {
            if ch.is_ascii_uppercase() && i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_uppercase());
        }
        f.write_str(&out)
    }
}
