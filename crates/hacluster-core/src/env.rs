//! Per-invocation library environment

use std::sync::Arc;

use tracing::debug;

use hacluster_comm::{CommandOutput, CommunicationCommand, NodeCommunicator, RemoteAction, Target};
use hacluster_exec::{CommandResult, CommandRunner, ExecError};
use hacluster_report::{ReportItem, ReportMark, ReportMessage, ReportProcessor};

use crate::config::{ClusterConfig, Settings};
use crate::error::Result;
use crate::state::PipelineState;

/// Everything one pipeline invocation owns
///
/// The report processor and the targets are never shared with another
/// invocation.
pub struct LibraryEnvironment {
    report_processor: ReportProcessor,
    communicator: NodeCommunicator,
    runner: Arc<dyn CommandRunner>,
    settings: Settings,
    cluster_name: String,
    node_targets: Vec<Target>,
    port: u16,
}

impl LibraryEnvironment {
    /// Create an environment for `cluster` whose node agents listen on `port`
    ///
    /// # Errors
    /// Returns an error if a node has no usable address.
    pub fn new(
        cluster: &ClusterConfig,
        port: u16,
        communicator: NodeCommunicator,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self> {
        let node_targets = cluster
            .nodes
            .iter()
            .map(|node| node.target(port))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            report_processor: ReportProcessor::new(),
            communicator,
            runner,
            settings: Settings::default(),
            cluster_name: cluster.name.clone(),
            node_targets,
            port,
        })
    }

    /// Use a preconfigured report processor, e.g. one honoring force flags
    #[must_use]
    pub fn with_report_processor(mut self, report_processor: ReportProcessor) -> Self {
        self.report_processor = report_processor;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn report_processor(&mut self) -> &mut ReportProcessor {
        &mut self.report_processor
    }

    /// Reports recorded so far in insertion order
    #[must_use]
    pub fn reports(&self) -> &[ReportItem] {
        self.report_processor.items()
    }

    #[must_use]
    pub fn into_reports(self) -> Vec<ReportItem> {
        self.report_processor.into_items()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// Targets of all cluster nodes
    #[must_use]
    pub fn node_targets(&self) -> &[Target] {
        &self.node_targets
    }

    /// Target for `host`, reusing the cluster node's addresses when it is one
    ///
    /// # Errors
    /// Returns an error if `host` is empty.
    pub fn target_for_host(&self, host: &str) -> Result<Target> {
        if let Some(target) = self.node_targets.iter().find(|t| t.label() == host) {
            return Ok(target.clone());
        }
        if host.is_empty() {
            return Err(crate::error::CoreError::invalid_input("empty host name"));
        }
        Ok(Target::from_hosts(host, &[host], self.port)?)
    }

    /// Current end of the report list
    #[must_use]
    pub fn mark(&self) -> ReportMark {
        self.report_processor.mark()
    }

    /// Terminal state of a pipeline that started at `mark` and ran to the end
    #[must_use]
    pub fn finished_since(&self, mark: ReportMark) -> PipelineState {
        PipelineState::finished(self.report_processor.since(mark))
    }

    /// Run a communication command, folding its reports into this environment
    pub async fn run_command<A: RemoteAction>(
        &mut self,
        command: CommunicationCommand<A>,
    ) -> CommandOutput<A::Output> {
        command
            .run(&self.communicator, &mut self.report_processor)
            .await
    }

    /// Run a local program, recording debug reports around it
    ///
    /// # Errors
    /// Returns an error if the program could not be run at all.
    pub async fn run_local(
        &mut self,
        args: &[String],
        stdin: Option<&str>,
    ) -> std::result::Result<CommandResult, ExecError> {
        let command = args.join(" ");
        debug!(command = %command, runner = self.runner.runner_type(), "running local command");
        self.report_processor.process(ReportItem::debug(
            ReportMessage::RunExternalProcessStarted {
                command: command.clone(),
                stdin: stdin.map(str::to_string),
            },
        ));

        let result = self.runner.run(args, stdin).await?;

        self.report_processor.process(ReportItem::debug(
            ReportMessage::RunExternalProcessFinished {
                command,
                return_value: result.status,
                stdout: result.stdout.clone(),
                stderr: result.stderr.clone(),
            },
        ));
        Ok(result)
    }
}
