//! Command handlers

use std::path::Path;
use std::sync::Arc;

use eyre::{Result, WrapErr, bail};
use tracing::info;

use hacluster_comm::{HttpTransport, NodeCommunicator};
use hacluster_core::commands::{
    BoothConfig, CorosyncConfPush, add_device_net, config_sync, provision_net_certificates,
    pull_config, push_corosync_conf, qdevice_client_on_nodes,
};
use hacluster_core::communication::booth::{BoothAuthfile, FetchedBoothConfig, config_file_name};
use hacluster_core::{LibraryEnvironment, PipelineState};
use hacluster_exec::{LocalRunner, proxy_set_in_environment};
use hacluster_report::{ReportItem, ReportMessage, ServiceAction};

use crate::config::Config;
use crate::{BoothCommand, Commands, CorosyncCommand, QdeviceCommand};

/// Build the library environment described by `config`
pub fn environment(config: &Config) -> Result<LibraryEnvironment> {
    let transport = HttpTransport::new(config.communication.verify_tls)?;
    let communicator = NodeCommunicator::new(
        Arc::new(transport),
        config.communication.communicator_settings(),
    )
    .with_proxy_set(proxy_set_in_environment());

    let env = LibraryEnvironment::new(
        &config.cluster_config(),
        config.communication.port,
        communicator,
        Arc::new(LocalRunner::new()),
    )?
    .with_settings(config.settings.clone());
    Ok(env)
}

/// Run one command to its terminal state
pub async fn run(env: &mut LibraryEnvironment, command: Commands) -> Result<PipelineState> {
    match command {
        Commands::Corosync(CorosyncCommand::Push {
            file,
            need_stopped_cluster,
            qdevice_reload,
            skip,
        }) => {
            let conf = CorosyncConfPush::new(read_text(&file).await?)
                .need_stopped_cluster(need_stopped_cluster)
                .need_qdevice_reload(qdevice_reload);
            Ok(push_corosync_conf(env, &conf, skip.skip_offline).await)
        }

        Commands::Qdevice(QdeviceCommand::Certs { qnetd_hosts, skip }) => {
            Ok(provision_net_certificates(env, &qnetd_hosts, skip.skip_offline).await?)
        }
        Commands::Qdevice(QdeviceCommand::Add {
            qnetd_hosts,
            corosync_conf,
            skip,
        }) => {
            let conf = CorosyncConfPush::new(read_text(&corosync_conf).await?);
            Ok(add_device_net(env, &qnetd_hosts, &conf, skip.skip_offline).await?)
        }
        Commands::Qdevice(QdeviceCommand::Start(skip)) => {
            Ok(qdevice_client_on_nodes(env, ServiceAction::Start, skip.skip_offline).await)
        }
        Commands::Qdevice(QdeviceCommand::Stop(skip)) => {
            Ok(qdevice_client_on_nodes(env, ServiceAction::Stop, skip.skip_offline).await)
        }
        Commands::Qdevice(QdeviceCommand::Enable(skip)) => {
            Ok(qdevice_client_on_nodes(env, ServiceAction::Enable, skip.skip_offline).await)
        }
        Commands::Qdevice(QdeviceCommand::Disable(skip)) => {
            Ok(qdevice_client_on_nodes(env, ServiceAction::Disable, skip.skip_offline).await)
        }

        Commands::Booth(BoothCommand::Sync {
            name,
            config,
            authfile,
            skip,
        }) => {
            let authfile = match authfile {
                Some(path) => Some(read_authfile(&path).await?),
                None => None,
            };
            let booth = BoothConfig {
                name,
                config: read_text(&config).await?,
                authfile,
            };
            Ok(config_sync(env, &booth, skip.skip_offline).await)
        }
        Commands::Booth(BoothCommand::Pull { name, node }) => {
            let (state, fetched) = pull_config(env, &node, &name).await?;
            if let Some(fetched) = fetched {
                let dir = env.settings().booth_config_dir.clone();
                save_booth_config(&dir, &name, &fetched).await?;
                env.report_processor()
                    .process(ReportItem::info(ReportMessage::BoothConfigAcceptedByNode {
                        node: None,
                        name_list: vec![name],
                    }));
            }
            Ok(state)
        }
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("unable to read {}", path.display()))
}

async fn read_authfile(path: &Path) -> Result<BoothAuthfile> {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        bail!("invalid authfile path {}", path.display());
    };
    let data = tokio::fs::read(path)
        .await
        .wrap_err_with(|| format!("unable to read {}", path.display()))?;
    Ok(BoothAuthfile {
        name: name.to_string(),
        data,
    })
}

/// Plain file name, refusing anything that would leave `dir`
fn file_in_dir(dir: &Path, name: &str) -> Result<std::path::PathBuf> {
    match Path::new(name).file_name() {
        Some(file) if file == name => Ok(dir.join(file)),
        _ => bail!("refusing to write booth file '{name}' outside {}", dir.display()),
    }
}

/// Write a fetched configuration and its authfile, replacing existing files
async fn save_booth_config(dir: &Path, name: &str, fetched: &FetchedBoothConfig) -> Result<()> {
    let config_path = file_in_dir(dir, &config_file_name(name))?;
    tokio::fs::write(&config_path, &fetched.config)
        .await
        .wrap_err_with(|| format!("unable to write {}", config_path.display()))?;
    info!(path = %config_path.display(), "booth configuration saved");

    if let Some(authfile) = &fetched.authfile {
        let key_path = file_in_dir(dir, &authfile.name)?;
        tokio::fs::write(&key_path, &authfile.data)
            .await
            .wrap_err_with(|| format!("unable to write {}", key_path.display()))?;
        info!(path = %key_path.display(), "booth authfile saved");
    }
    Ok(())
}
