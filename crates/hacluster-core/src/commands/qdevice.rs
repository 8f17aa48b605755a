//! Quorum device operations

use tracing::{info, instrument};

use hacluster_comm::CommunicationCommand;
use hacluster_report::{ReportItem, ReportMessage, ServiceAction};

use crate::commands::corosync::{CorosyncConfPush, push_corosync_conf};
use crate::communication::qdevice::{
    GetCaCertificate, ImportCertificate, InitCertificateStorage, SignCertificateRequest,
};
use crate::communication::services::QdeviceClientService;
use crate::env::LibraryEnvironment;
use crate::error::{CoreError, Result};
use crate::local;
use crate::state::{PipelineState, PipelineStep};

/// Run a quorum device client service action on every cluster node
#[instrument(skip(env), fields(nodes = env.node_targets().len()))]
pub async fn qdevice_client_on_nodes(
    env: &mut LibraryEnvironment,
    action: ServiceAction,
    skip_offline_nodes: bool,
) -> PipelineState {
    let mark = env.mark();
    let targets = env.node_targets().to_vec();
    let output = env
        .run_command(
            CommunicationCommand::all(QdeviceClientService::new(action).announced(), targets)
                .skip_offline_nodes(skip_offline_nodes),
        )
        .await;
    if output.verdict.is_failure() {
        return PipelineState::Aborted {
            step: PipelineStep::ServiceCommand,
        };
    }
    env.finished_since(mark)
}

/// Issue quorum device client certificates to every cluster node
///
/// The CA certificate and the signature come from the first qnetd host that
/// answers; certificates are installed on all nodes.
///
/// # Errors
/// Returns an error if `qnetd_hosts` is empty or contains an empty name.
#[instrument(skip(env), fields(nodes = env.node_targets().len()))]
pub async fn provision_net_certificates(
    env: &mut LibraryEnvironment,
    qnetd_hosts: &[String],
    skip_offline_nodes: bool,
) -> Result<PipelineState> {
    if qnetd_hosts.is_empty() {
        return Err(CoreError::invalid_input("no quorum device host given"));
    }
    let qnetd_targets = qnetd_hosts
        .iter()
        .map(|host| env.target_for_host(host))
        .collect::<Result<Vec<_>>>()?;
    let node_targets = env.node_targets().to_vec();
    let mark = env.mark();

    env.report_processor().process(ReportItem::info(
        ReportMessage::QdeviceCertificateDistributionStarted,
    ));

    let output = env
        .run_command(CommunicationCommand::first_success(
            GetCaCertificate,
            qnetd_targets.clone(),
        ))
        .await;
    let Some(ca_certificate) = output.into_first_output() else {
        return Ok(PipelineState::Aborted {
            step: PipelineStep::FetchCaCertificate,
        });
    };

    let output = env
        .run_command(
            CommunicationCommand::all(
                InitCertificateStorage { ca_certificate },
                node_targets.clone(),
            )
            .skip_offline_nodes(skip_offline_nodes),
        )
        .await;
    if output.verdict.is_failure() {
        return Ok(PipelineState::Aborted {
            step: PipelineStep::InitCertificateStorage,
        });
    }

    let cluster_name = env.cluster_name().to_string();
    let certificate_request = match local::generate_certificate_request(env, &cluster_name).await {
        Ok(request) => request,
        Err(report) => {
            env.report_processor().process(report);
            return Ok(PipelineState::Aborted {
                step: PipelineStep::CertificateRequest,
            });
        }
    };

    let output = env
        .run_command(CommunicationCommand::first_success(
            SignCertificateRequest {
                certificate_request,
                cluster_name,
            },
            qnetd_targets,
        ))
        .await;
    let Some(signed_certificate) = output.into_first_output() else {
        return Ok(PipelineState::Aborted {
            step: PipelineStep::SignCertificate,
        });
    };

    let certificate = match local::signed_certificate_to_pk12(env, &signed_certificate).await {
        Ok(certificate) => certificate,
        Err(report) => {
            env.report_processor().process(report);
            return Ok(PipelineState::Aborted {
                step: PipelineStep::CertificateConversion,
            });
        }
    };

    let output = env
        .run_command(
            CommunicationCommand::all(ImportCertificate { certificate }, node_targets)
                .skip_offline_nodes(skip_offline_nodes),
        )
        .await;
    if output.verdict.is_failure() {
        return Ok(PipelineState::Aborted {
            step: PipelineStep::ImportCertificate,
        });
    }

    info!("quorum device certificates distributed");
    Ok(env.finished_since(mark))
}

/// Add a net model quorum device to the cluster
///
/// Provisions certificates, enables the client on all nodes, distributes
/// the corosync configuration naming the device and starts the client.
///
/// # Errors
/// Returns an error if `qnetd_hosts` is empty or contains an empty name.
#[instrument(skip(env, conf))]
pub async fn add_device_net(
    env: &mut LibraryEnvironment,
    qnetd_hosts: &[String],
    conf: &CorosyncConfPush,
    skip_offline_nodes: bool,
) -> Result<PipelineState> {
    let mark = env.mark();

    let state = provision_net_certificates(env, qnetd_hosts, skip_offline_nodes).await?;
    if state.is_aborted() {
        return Ok(state);
    }

    let targets = env.node_targets().to_vec();
    let output = env
        .run_command(
            CommunicationCommand::all(
                QdeviceClientService::new(ServiceAction::Enable).announced(),
                targets.clone(),
            )
            .skip_offline_nodes(skip_offline_nodes),
        )
        .await;
    if output.verdict.is_failure() {
        return Ok(PipelineState::Aborted {
            step: PipelineStep::EnableService,
        });
    }

    let state = push_corosync_conf(env, conf, skip_offline_nodes).await;
    if state.is_aborted() {
        return Ok(state);
    }

    let output = env
        .run_command(
            CommunicationCommand::all(
                QdeviceClientService::new(ServiceAction::Start).announced(),
                targets,
            )
            .skip_offline_nodes(skip_offline_nodes),
        )
        .await;
    if output.verdict.is_failure() {
        return Ok(PipelineState::Aborted {
            step: PipelineStep::StartService,
        });
    }

    Ok(env.finished_since(mark))
}
