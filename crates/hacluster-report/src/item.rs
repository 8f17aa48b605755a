//! Report items, severities and force categories

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::message::{ReportCode, ReportMessage};

/// How serious a reported event is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Category a caller supplies to override a forceable error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForceCode {
    /// Tolerate unreachable or misbehaving nodes
    SkipOfflineNodes,
    /// Generic override
    Force,
}

impl fmt::Display for ForceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForceCode::SkipOfflineNodes => f.write_str("SKIP_OFFLINE_NODES"),
            ForceCode::Force => f.write_str("FORCE"),
        }
    }
}

/// Severity plus optional force category, decided before the message is known
///
/// Commands decide *how bad* a failure is once and then attach that decision
/// to every report describing the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Problem {
    pub severity: Severity,
    pub forceable: Option<ForceCode>,
}

impl Problem {
    /// Unforceable error
    #[must_use]
    pub const fn error() -> Self {
        Self {
            severity: Severity::Error,
            forceable: None,
        }
    }

    /// Plain warning
    #[must_use]
    pub const fn warning() -> Self {
        Self {
            severity: Severity::Warning,
            forceable: None,
        }
    }

    /// Error that the given force category overrides
    #[must_use]
    pub const fn forceable(code: ForceCode) -> Self {
        Self {
            severity: Severity::Error,
            forceable: Some(code),
        }
    }

    /// Warning when the caller already supplied `code`, forceable error otherwise
    #[must_use]
    pub const fn for_force(code: ForceCode, is_forced: bool) -> Self {
        if is_forced {
            Self::warning()
        } else {
            Self::forceable(code)
        }
    }

    /// Check if this problem stops an operation
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// One immutable, typed description of a noteworthy event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportItem {
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forceable: Option<ForceCode>,
    #[serde(flatten)]
    pub message: ReportMessage,
}

impl ReportItem {
    /// Create a report with explicit severity and no force category
    #[must_use]
    pub fn new(severity: Severity, message: ReportMessage) -> Self {
        Self {
            severity,
            forceable: None,
            message,
        }
    }

    #[must_use]
    pub fn debug(message: ReportMessage) -> Self {
        Self::new(Severity::Debug, message)
    }

    #[must_use]
    pub fn info(message: ReportMessage) -> Self {
        Self::new(Severity::Info, message)
    }

    #[must_use]
    pub fn warning(message: ReportMessage) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Unforceable error
    #[must_use]
    pub fn error(message: ReportMessage) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Error overridable by supplying `code`
    #[must_use]
    pub fn forceable_error(code: ForceCode, message: ReportMessage) -> Self {
        Self {
            severity: Severity::Error,
            forceable: Some(code),
            message,
        }
    }

    /// Create a report carrying a previously decided problem
    #[must_use]
    pub fn from_problem(problem: Problem, message: ReportMessage) -> Self {
        Self {
            severity: problem.severity,
            forceable: problem.forceable,
            message,
        }
    }

    /// Event kind of this report
    #[must_use]
    pub fn code(&self) -> ReportCode {
        self.message.code()
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Turn an error into a plain warning, leaving other severities alone
    #[must_use]
    pub fn downgraded(self) -> Self {
        if self.severity == Severity::Error {
            Self::new(Severity::Warning, self.message)
        } else {
            self
        }
    }
}
