//! Per-target outcomes of a remote request

use std::fmt;

use crate::target::NodeAddress;

/// Why a request to a node failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotConnected,
    TimedOut,
    NotAuthorized,
    PermissionDenied,
    UnsupportedCommand,
    CommandUnsuccessful,
    Other,
}

/// Origin of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The node could not be reached
    Connectivity,
    /// The node answered and refused or failed the request
    Command,
}

impl ErrorKind {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            ErrorKind::NotConnected | ErrorKind::TimedOut => ErrorClass::Connectivity,
            ErrorKind::NotAuthorized
            | ErrorKind::PermissionDenied
            | ErrorKind::UnsupportedCommand
            | ErrorKind::CommandUnsuccessful
            | ErrorKind::Other => ErrorClass::Command,
        }
    }

    /// Classify an HTTP status; `None` for success statuses
    ///
    /// The returned reason is the trimmed body for `400` and a generic
    /// `HTTP error` text for everything else.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Option<(Self, String)> {
        let kind = match status {
            200..=299 => return None,
            400 => return Some((ErrorKind::CommandUnsuccessful, body.trim_end().to_string())),
            401 => ErrorKind::NotAuthorized,
            403 => ErrorKind::PermissionDenied,
            404 => ErrorKind::UnsupportedCommand,
            _ => ErrorKind::Other,
        };
        Some((kind, format!("HTTP error: {status}")))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotConnected => "not-connected",
            ErrorKind::TimedOut => "timed-out",
            ErrorKind::NotAuthorized => "not-authorized",
            ErrorKind::PermissionDenied => "permission-denied",
            ErrorKind::UnsupportedCommand => "unsupported-command",
            ErrorKind::CommandUnsuccessful => "command-unsuccessful",
            ErrorKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// What came back from a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { status: u16, body: String },
    Failure { kind: ErrorKind, reason: String },
}

/// Outcome of one request to one target
///
/// Created once per target per command run and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunicationResult {
    /// Label of the target
    pub target: String,
    /// Last address tried, `None` if no attempt could be made
    pub address: Option<NodeAddress>,
    pub outcome: Outcome,
}

impl CommunicationResult {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Response body on success
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { body, .. } => Some(body),
            Outcome::Failure { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(ErrorKind::from_status(200, "ok"), None);
        assert_eq!(
            ErrorKind::from_status(400, "Failed\n"),
            Some((ErrorKind::CommandUnsuccessful, "Failed".to_string()))
        );
        assert_eq!(
            ErrorKind::from_status(401, "whatever"),
            Some((ErrorKind::NotAuthorized, "HTTP error: 401".to_string()))
        );
        assert_eq!(
            ErrorKind::from_status(403, ""),
            Some((ErrorKind::PermissionDenied, "HTTP error: 403".to_string()))
        );
        assert_eq!(
            ErrorKind::from_status(404, ""),
            Some((ErrorKind::UnsupportedCommand, "HTTP error: 404".to_string()))
        );
        assert_eq!(
            ErrorKind::from_status(500, "boom"),
            Some((ErrorKind::Other, "HTTP error: 500".to_string()))
        );
    }

    #[test]
    fn test_classes() {
        assert_eq!(ErrorKind::TimedOut.class(), ErrorClass::Connectivity);
        assert_eq!(ErrorKind::NotConnected.class(), ErrorClass::Connectivity);
        assert_eq!(ErrorKind::PermissionDenied.class(), ErrorClass::Command);
        assert_eq!(ErrorKind::Other.class(), ErrorClass::Command);
    }
}
