//! Remote actions bound to targets under a run strategy

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use hacluster_report::{
    ForceCode, Problem, ReportItem, ReportMessage, ReportProcessor, Severity,
};

use crate::communicator::NodeCommunicator;
use crate::policy::{classify, failure_report};
use crate::request::RequestData;
use crate::response::{CommunicationResult, Outcome};
use crate::target::Target;

/// How a command walks its targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStrategy {
    /// Every target, concurrently
    All,
    /// Targets in order until one succeeds
    FirstSuccess,
}

/// Node a response came from plus the command's offline policy
#[derive(Debug, Clone, Copy)]
pub struct ResponseContext<'a> {
    pub node: &'a str,
    pub skip_offline_nodes: bool,
}

impl ResponseContext<'_> {
    /// Problem for a node that cannot be used, honoring `skip_offline_nodes`
    #[must_use]
    pub fn offline_problem(&self) -> Problem {
        Problem::for_force(ForceCode::SkipOfflineNodes, self.skip_offline_nodes)
    }
}

/// What an action made of a successful response
#[derive(Debug)]
pub enum NodeVerdict<T> {
    /// The node did what was asked
    Accepted { output: T, reports: Vec<ReportItem> },
    /// The node answered but the answer is unusable or a refusal
    Rejected { reports: Vec<ReportItem> },
}

impl<T> NodeVerdict<T> {
    /// Accept without any report
    pub fn accepted(output: T) -> Self {
        Self::Accepted {
            output,
            reports: Vec::new(),
        }
    }

    /// Accept with one report
    pub fn accepted_with(output: T, report: ReportItem) -> Self {
        Self::Accepted {
            output,
            reports: vec![report],
        }
    }

    /// Reject with one report
    pub fn rejected(report: ReportItem) -> Self {
        Self::Rejected {
            reports: vec![report],
        }
    }
}

/// One kind of remote work: its request shape and how to read answers
pub trait RemoteAction {
    /// Data extracted from each accepted response
    type Output;

    /// Request sent to every target; built once per run
    fn request(&self) -> RequestData;

    /// Reports announcing the command, processed before any request
    fn started(&self) -> Vec<ReportItem> {
        Vec::new()
    }

    /// Interpret a successful response
    fn on_success(&self, ctx: &ResponseContext<'_>, body: &str) -> NodeVerdict<Self::Output>;

    /// Extra reports for a failed request, carrying the already decided problem
    fn on_failure(
        &self,
        _ctx: &ResponseContext<'_>,
        _reason: &str,
        _problem: Problem,
    ) -> Vec<ReportItem> {
        Vec::new()
    }
}

/// Aggregate verdict over the reports a command added
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    SuccessWithWarnings,
    Failure,
}

impl Verdict {
    /// Failure on any error, success with warnings on any warning
    #[must_use]
    pub fn from_reports(reports: &[ReportItem]) -> Self {
        let worst = reports.iter().map(|item| item.severity).max();
        match worst {
            Some(Severity::Error) => Verdict::Failure,
            Some(Severity::Warning) => Verdict::SuccessWithWarnings,
            _ => Verdict::Success,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        *self == Verdict::Failure
    }
}

/// Everything a finished command produced besides its reports
#[derive(Debug)]
pub struct CommandOutput<T> {
    pub verdict: Verdict,
    /// Outputs of accepted nodes, in completion order
    pub outputs: Vec<(String, T)>,
    /// Raw result per attempted target, in completion order
    pub results: Vec<CommunicationResult>,
}

impl<T> CommandOutput<T> {
    /// Output of the first accepted node
    #[must_use]
    pub fn into_first_output(self) -> Option<T> {
        self.outputs.into_iter().next().map(|(_, output)| output)
    }
}

/// A remote action dispatched to a set of targets
///
/// Consumed by [`run`](Self::run); build a new command to retry.
#[derive(Debug)]
pub struct CommunicationCommand<A> {
    action: A,
    targets: Vec<Target>,
    skip_offline_nodes: bool,
    strategy: RunStrategy,
}

impl<A: RemoteAction> CommunicationCommand<A> {
    pub fn new(action: A, targets: Vec<Target>, strategy: RunStrategy) -> Self {
        Self {
            action,
            targets,
            skip_offline_nodes: false,
            strategy,
        }
    }

    /// Command contacting every target
    pub fn all(action: A, targets: Vec<Target>) -> Self {
        Self::new(action, targets, RunStrategy::All)
    }

    /// Command stopping at the first target that succeeds
    pub fn first_success(action: A, targets: Vec<Target>) -> Self {
        Self::new(action, targets, RunStrategy::FirstSuccess)
    }

    /// Downgrade per-node failures to warnings
    ///
    /// Has no effect on [`RunStrategy::FirstSuccess`], where a failed node is
    /// only fatal when no other node succeeds.
    #[must_use]
    pub fn skip_offline_nodes(mut self, skip: bool) -> Self {
        self.skip_offline_nodes = skip;
        self
    }

    #[must_use]
    pub fn strategy(&self) -> RunStrategy {
        self.strategy
    }

    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Run the command and fold every outcome into `processor`
    pub async fn run(
        self,
        communicator: &NodeCommunicator,
        processor: &mut ReportProcessor,
    ) -> CommandOutput<A::Output> {
        let mark = processor.mark();
        let request = self.action.request();
        info!(
            action = %request.action(),
            targets = self.targets.len(),
            strategy = ?self.strategy,
            "running command"
        );

        processor.process_list(self.action.started());

        let mut outputs = Vec::new();
        let mut results = Vec::new();
        match self.strategy {
            RunStrategy::All => {
                self.run_all(communicator, &request, processor, &mut outputs, &mut results)
                    .await;
            }
            RunStrategy::FirstSuccess => {
                self.run_first_success(communicator, &request, processor, &mut outputs, &mut results)
                    .await;
            }
        }

        let verdict = Verdict::from_reports(processor.since(mark));
        debug!(action = %request.action(), verdict = ?verdict, "command finished");
        CommandOutput {
            verdict,
            outputs,
            results,
        }
    }

    /// Contact every target with at most `max_concurrency` in flight
    ///
    /// Results are folded in completion order. A failing target never
    /// cancels the others. When no target was accepted and every failure was
    /// skipped, the command still fails as unable to reach any node.
    async fn run_all(
        &self,
        communicator: &NodeCommunicator,
        request: &RequestData,
        processor: &mut ReportProcessor,
        outputs: &mut Vec<(String, A::Output)>,
        results: &mut Vec<CommunicationResult>,
    ) {
        let mark = processor.mark();
        let mut in_flight = stream::iter(&self.targets)
            .map(|target| communicator.call(target, request))
            .buffer_unordered(communicator.settings().max_concurrency.max(1));

        while let Some(exchange) = in_flight.next().await {
            processor.process_list(exchange.reports);
            let result = exchange.result;
            let ctx = ResponseContext {
                node: &result.target,
                skip_offline_nodes: self.skip_offline_nodes,
            };
            match &result.outcome {
                Outcome::Success { body, .. } => match self.action.on_success(&ctx, body) {
                    NodeVerdict::Accepted {
                        output,
                        reports,
                    } => {
                        processor.process_list(reports);
                        outputs.push((result.target.clone(), output));
                    }
                    NodeVerdict::Rejected { reports } => processor.process_list(reports),
                },
                Outcome::Failure { kind, reason } => {
                    let problem = classify(*kind, self.skip_offline_nodes);
                    processor.process(failure_report(
                        &result.target,
                        request.action(),
                        *kind,
                        reason,
                        problem,
                    ));
                    processor.process_list(self.action.on_failure(&ctx, reason, problem));
                }
            }
            results.push(result);
        }

        let already_failed = processor.since(mark).iter().any(ReportItem::is_error);
        if !self.targets.is_empty() && outputs.is_empty() && !already_failed {
            warn!(action = %request.action(), "no target accepted the request");
            processor.process(ReportItem::error(
                ReportMessage::UnableToPerformOperationOnAnyNode,
            ));
        }
    }

    /// Try targets one by one until one is accepted
    ///
    /// Failures are held back: they become warnings once a later target
    /// succeeds and unforceable errors when none does.
    async fn run_first_success(
        &self,
        communicator: &NodeCommunicator,
        request: &RequestData,
        processor: &mut ReportProcessor,
        outputs: &mut Vec<(String, A::Output)>,
        results: &mut Vec<CommunicationResult>,
    ) {
        let mut deferred: Vec<ReportItem> = Vec::new();

        for target in &self.targets {
            let exchange = communicator.call(target, request).await;
            processor.process_list(exchange.reports);
            let result = exchange.result;
            let ctx = ResponseContext {
                node: &result.target,
                skip_offline_nodes: false,
            };

            let accepted = match &result.outcome {
                Outcome::Success { body, .. } => match self.action.on_success(&ctx, body) {
                    NodeVerdict::Accepted { output, reports } => Some((output, reports)),
                    NodeVerdict::Rejected { reports } => {
                        deferred.extend(reports);
                        None
                    }
                },
                Outcome::Failure { kind, reason } => {
                    let problem = Problem::error();
                    deferred.push(failure_report(
                        &result.target,
                        request.action(),
                        *kind,
                        reason,
                        problem,
                    ));
                    deferred.extend(self.action.on_failure(&ctx, reason, problem));
                    None
                }
            };

            if let Some((output, reports)) = accepted {
                processor.process_list(deferred.into_iter().map(ReportItem::downgraded));
                processor.process_list(reports);
                outputs.push((result.target.clone(), output));
                results.push(result);
                return;
            }
            results.push(result);
        }

        processor.process_list(deferred);
        processor.process(ReportItem::error(
            ReportMessage::UnableToPerformOperationOnAnyNode,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_reports() {
        let warning = ReportItem::warning(ReportMessage::CorosyncConfigReloaded);
        let error = ReportItem::error(ReportMessage::CorosyncConfigReloaded);
        let info = ReportItem::info(ReportMessage::CorosyncConfigReloaded);

        assert_eq!(Verdict::from_reports(&[]), Verdict::Success);
        assert_eq!(Verdict::from_reports(&[info.clone()]), Verdict::Success);
        assert_eq!(
            Verdict::from_reports(&[info.clone(), warning.clone()]),
            Verdict::SuccessWithWarnings
        );
        assert_eq!(Verdict::from_reports(&[warning, error, info]), Verdict::Failure);
    }

    #[test]
    fn test_offline_problem() {
        let ctx = ResponseContext {
            node: "node1",
            skip_offline_nodes: false,
        };
        assert_eq!(ctx.offline_problem(), Problem::forceable(ForceCode::SkipOfflineNodes));

        let ctx = ResponseContext {
            node: "node1",
            skip_offline_nodes: true,
        };
        assert_eq!(ctx.offline_problem(), Problem::warning());
    }
}
