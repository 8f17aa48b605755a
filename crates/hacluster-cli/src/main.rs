//! hacluster CLI
//!
//! Distributes cluster configuration and credentials to cluster nodes
//! through their node agents.
//!
//! # Usage
//!
//! ```text
//! hacluster [OPTIONS] <COMMAND>
//!
//! Commands:
//!   corosync  Corosync configuration
//!   qdevice   Quorum device setup and client control
//!   booth     Booth configuration
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod console_report;

use config::Config;

/// Cluster configuration distribution tool
#[derive(Parser, Debug)]
#[command(name = "hacluster", version, about)]
struct Cli {
    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print debug reports
    #[arg(long, global = true)]
    debug: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Corosync configuration
    #[command(subcommand)]
    Corosync(CorosyncCommand),
    /// Quorum device setup and client control
    #[command(subcommand)]
    Qdevice(QdeviceCommand),
    /// Booth configuration
    #[command(subcommand)]
    Booth(BoothCommand),
}

#[derive(Args, Debug, Clone, Copy)]
struct SkipOffline {
    /// Treat unreachable or failing nodes as warnings
    #[arg(long)]
    skip_offline: bool,
}

#[derive(Subcommand, Debug)]
enum CorosyncCommand {
    /// Send a corosync.conf to all nodes and reload it
    Push {
        /// corosync.conf to distribute
        file: PathBuf,
        /// Refuse to push while corosync runs on any node
        #[arg(long)]
        need_stopped_cluster: bool,
        /// Restart quorum device clients afterwards
        #[arg(long)]
        qdevice_reload: bool,
        #[command(flatten)]
        skip: SkipOffline,
    },
}

#[derive(Subcommand, Debug)]
enum QdeviceCommand {
    /// Issue quorum device client certificates to all nodes
    Certs {
        /// Quorum device server, tried in order
        #[arg(long = "qnetd-host", required = true, num_args = 1..)]
        qnetd_hosts: Vec<String>,
        #[command(flatten)]
        skip: SkipOffline,
    },
    /// Add a net model quorum device
    Add {
        /// Quorum device server, tried in order
        #[arg(long = "qnetd-host", required = true, num_args = 1..)]
        qnetd_hosts: Vec<String>,
        /// corosync.conf containing the device
        #[arg(long)]
        corosync_conf: PathBuf,
        #[command(flatten)]
        skip: SkipOffline,
    },
    /// Start the quorum device client on all nodes
    Start(SkipOffline),
    /// Stop the quorum device client on all nodes
    Stop(SkipOffline),
    /// Enable the quorum device client on all nodes
    Enable(SkipOffline),
    /// Disable the quorum device client on all nodes
    Disable(SkipOffline),
}

#[derive(Subcommand, Debug)]
enum BoothCommand {
    /// Send a booth configuration to all nodes
    Sync {
        /// Booth instance name
        #[arg(long)]
        name: String,
        /// Booth configuration file
        #[arg(long)]
        config: PathBuf,
        /// Booth authentication key
        #[arg(long)]
        authfile: Option<PathBuf>,
        #[command(flatten)]
        skip: SkipOffline,
    },
    /// Fetch a booth configuration from a node and save it locally
    Pull {
        /// Booth instance name
        #[arg(long)]
        name: String,
        /// Node to fetch from
        #[arg(long)]
        node: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::new(if cli.debug { "debug" } else { cli.log_level.as_str() })
        });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load_default(cli.config.as_deref())?;
    let mut env = commands::environment(&config)?;

    let outcome = commands::run(&mut env, cli.command).await;
    console_report::print_reports(env.reports(), cli.debug);
    let state = outcome?;

    tracing::info!(state = %state, "operation finished");
    if state.is_aborted() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_qdevice_add() {
        let cli = Cli::try_parse_from([
            "hacluster",
            "qdevice",
            "add",
            "--qnetd-host",
            "qnetd-a",
            "qnetd-b",
            "--corosync-conf",
            "corosync.conf",
            "--skip-offline",
        ])
        .unwrap();

        match cli.command {
            Commands::Qdevice(QdeviceCommand::Add {
                qnetd_hosts, skip, ..
            }) => {
                assert_eq!(qnetd_hosts, vec!["qnetd-a", "qnetd-b"]);
                assert!(skip.skip_offline);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_certs_require_host() {
        assert!(Cli::try_parse_from(["hacluster", "qdevice", "certs"]).is_err());
    }
}
