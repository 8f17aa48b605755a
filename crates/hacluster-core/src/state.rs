//! Pipeline terminal states

use std::fmt;

use hacluster_report::{ReportItem, Severity};

/// Step of a pipeline, named in the aborted state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    PreconditionCheck,
    Distribute,
    Reload,
    ServiceResync,
    FetchCaCertificate,
    InitCertificateStorage,
    CertificateRequest,
    SignCertificate,
    CertificateConversion,
    ImportCertificate,
    EnableService,
    StartService,
    ServiceCommand,
    BoothDistribute,
    BoothFetch,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStep::PreconditionCheck => "precondition check",
            PipelineStep::Distribute => "configuration distribution",
            PipelineStep::Reload => "configuration reload",
            PipelineStep::ServiceResync => "quorum device client restart",
            PipelineStep::FetchCaCertificate => "CA certificate fetch",
            PipelineStep::InitCertificateStorage => "certificate storage initialization",
            PipelineStep::CertificateRequest => "certificate request generation",
            PipelineStep::SignCertificate => "certificate signing",
            PipelineStep::CertificateConversion => "certificate conversion",
            PipelineStep::ImportCertificate => "certificate import",
            PipelineStep::EnableService => "service enable",
            PipelineStep::StartService => "service start",
            PipelineStep::ServiceCommand => "service command",
            PipelineStep::BoothDistribute => "booth configuration distribution",
            PipelineStep::BoothFetch => "booth configuration fetch",
        };
        f.write_str(s)
    }
}

/// Terminal state of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No step produced an error or warning
    Succeeded,
    /// Some nodes were skipped or degraded but policy allowed it
    SucceededWithWarnings,
    /// An error stopped the pipeline at `step`; later steps did not run
    Aborted { step: PipelineStep },
}

impl PipelineState {
    /// State of a pipeline that ran to the end, given its reports
    #[must_use]
    pub fn finished(reports: &[ReportItem]) -> Self {
        if reports.iter().any(|item| item.severity == Severity::Warning) {
            PipelineState::SucceededWithWarnings
        } else {
            PipelineState::Succeeded
        }
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, PipelineState::Aborted { .. })
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Succeeded => f.write_str("SUCCEEDED"),
            PipelineState::SucceededWithWarnings => f.write_str("SUCCEEDED_WITH_WARNINGS"),
            PipelineState::Aborted { step } => write!(f, "ABORTED ({step})"),
        }
    }
}
