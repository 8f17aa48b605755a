//! Corosync configuration distribution

use tracing::{info, instrument, warn};

use hacluster_comm::CommunicationCommand;
use hacluster_report::{ReportItem, ReportMessage, ServiceAction};

use crate::communication::corosync::{CheckCorosyncOffline, DistributeCorosyncConf};
use crate::communication::services::QdeviceClientService;
use crate::env::LibraryEnvironment;
use crate::local;
use crate::state::{PipelineState, PipelineStep};

/// A new corosync configuration and how it has to be applied
#[derive(Debug, Clone)]
pub struct CorosyncConfPush {
    /// Serialized configuration, distributed as is
    pub config_text: String,
    /// The change is only safe while corosync is stopped on every node
    pub need_stopped_cluster: bool,
    /// The change affects the quorum device, so its clients must restart
    pub need_qdevice_reload: bool,
}

impl CorosyncConfPush {
    pub fn new(config_text: impl Into<String>) -> Self {
        Self {
            config_text: config_text.into(),
            need_stopped_cluster: false,
            need_qdevice_reload: false,
        }
    }

    #[must_use]
    pub fn need_stopped_cluster(mut self, need: bool) -> Self {
        self.need_stopped_cluster = need;
        self
    }

    #[must_use]
    pub fn need_qdevice_reload(mut self, need: bool) -> Self {
        self.need_qdevice_reload = need;
        self
    }
}

/// Distribute a corosync configuration to all nodes and apply it
///
/// Steps: check corosync is stopped everywhere (only when the change needs
/// it), distribute, reload the local corosync if it runs, then restart
/// quorum device clients when asked to.
#[instrument(skip(env, conf), fields(nodes = env.node_targets().len()))]
pub async fn push_corosync_conf(
    env: &mut LibraryEnvironment,
    conf: &CorosyncConfPush,
    skip_offline_nodes: bool,
) -> PipelineState {
    let mark = env.mark();
    let targets = env.node_targets().to_vec();

    if conf.need_stopped_cluster {
        let output = env
            .run_command(
                CommunicationCommand::all(CheckCorosyncOffline, targets.clone())
                    .skip_offline_nodes(skip_offline_nodes),
            )
            .await;
        if output.verdict.is_failure() {
            warn!("corosync is not stopped on all nodes, configuration not sent");
            return PipelineState::Aborted {
                step: PipelineStep::PreconditionCheck,
            };
        }
    }

    let output = env
        .run_command(
            CommunicationCommand::all(
                DistributeCorosyncConf::new(conf.config_text.as_str()),
                targets.clone(),
            )
            .skip_offline_nodes(skip_offline_nodes),
        )
        .await;
    if output.verdict.is_failure() {
        return PipelineState::Aborted {
            step: PipelineStep::Distribute,
        };
    }

    let running = match local::is_service_running(env, "corosync").await {
        Ok(running) => running,
        Err(reason) => {
            env.report_processor().process(ReportItem::error(
                ReportMessage::CorosyncConfigReloadError { reason },
            ));
            return PipelineState::Aborted {
                step: PipelineStep::Reload,
            };
        }
    };
    if running {
        match local::reload_corosync_config(env).await {
            Ok(()) => env
                .report_processor()
                .process(ReportItem::info(ReportMessage::CorosyncConfigReloaded)),
            Err(reason) => {
                env.report_processor().process(ReportItem::error(
                    ReportMessage::CorosyncConfigReloadError { reason },
                ));
                return PipelineState::Aborted {
                    step: PipelineStep::Reload,
                };
            }
        }
    } else {
        info!("corosync is not running locally, reload skipped");
    }

    if conf.need_qdevice_reload {
        env.report_processor()
            .process(ReportItem::info(ReportMessage::QdeviceClientReloadStarted));
        let mut failed = false;
        for action in [ServiceAction::Stop, ServiceAction::Start] {
            let output = env
                .run_command(
                    CommunicationCommand::all(QdeviceClientService::new(action), targets.clone())
                        .skip_offline_nodes(skip_offline_nodes),
                )
                .await;
            failed |= output.verdict.is_failure();
        }
        if failed {
            return PipelineState::Aborted {
                step: PipelineStep::ServiceResync,
            };
        }
    }

    env.finished_since(mark)
}
