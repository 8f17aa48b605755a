//! Booth configuration synchronization

use tracing::instrument;

use hacluster_comm::CommunicationCommand;
use hacluster_report::{ReportItem, ReportMessage};

use crate::communication::booth::{
    BoothAuthfile, BoothGetConfig, BoothSendConfig, FetchedBoothConfig,
};
use crate::env::LibraryEnvironment;
use crate::error::{CoreError, Result};
use crate::state::{PipelineState, PipelineStep};

/// A local booth instance configuration
#[derive(Debug, Clone)]
pub struct BoothConfig {
    /// Instance name; the configuration file is `<name>.conf`
    pub name: String,
    pub config: String,
    pub authfile: Option<BoothAuthfile>,
}

/// Send a booth configuration and its authfile to every cluster node
#[instrument(skip(env, booth), fields(name = %booth.name))]
pub async fn config_sync(
    env: &mut LibraryEnvironment,
    booth: &BoothConfig,
    skip_offline_nodes: bool,
) -> PipelineState {
    let mark = env.mark();
    let mut action = BoothSendConfig::new(booth.name.as_str(), booth.config.as_str());
    if let Some(authfile) = &booth.authfile {
        action = action.with_authfile(authfile.clone());
    }

    let targets = env.node_targets().to_vec();
    let output = env
        .run_command(
            CommunicationCommand::all(action, targets).skip_offline_nodes(skip_offline_nodes),
        )
        .await;
    if output.verdict.is_failure() {
        return PipelineState::Aborted {
            step: PipelineStep::BoothDistribute,
        };
    }
    env.finished_since(mark)
}

/// Fetch the configuration of booth instance `name` from `node`
///
/// Nothing is written locally; the caller stores the returned files.
///
/// # Errors
/// Returns an error if `node` or `name` is empty.
#[instrument(skip(env))]
pub async fn pull_config(
    env: &mut LibraryEnvironment,
    node: &str,
    name: &str,
) -> Result<(PipelineState, Option<FetchedBoothConfig>)> {
    if name.is_empty() {
        return Err(CoreError::invalid_input("empty booth instance name"));
    }
    let target = env.target_for_host(node)?;
    let mark = env.mark();

    env.report_processor()
        .process(ReportItem::info(ReportMessage::BoothFetchingConfigFromNode {
            node: node.to_string(),
            config: Some(name.to_string()),
        }));

    let output = env
        .run_command(CommunicationCommand::first_success(
            BoothGetConfig::new(name),
            vec![target],
        ))
        .await;
    match output.into_first_output() {
        Some(config) => Ok((env.finished_since(mark), Some(config))),
        None => Ok((
            PipelineState::Aborted {
                step: PipelineStep::BoothFetch,
            },
            None,
        )),
    }
}
