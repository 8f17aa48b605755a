//! Local command execution using `tokio::process`

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, instrument};

use crate::error::ExecError;
use crate::result::CommandResult;
use crate::traits::CommandRunner;

/// Local command runner
///
/// Executes programs directly (no shell) with a `C` locale so that tool
/// output can be parsed.
#[derive(Debug, Clone, Default)]
pub struct LocalRunner {
    timeout: Option<Duration>,
}

impl LocalRunner {
    /// Create a new local runner without a timeout
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill commands that run longer than `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Internal method to execute command
    async fn execute(&self, args: &[String], stdin: Option<&str>) -> Result<CommandResult, ExecError> {
        let Some((program, rest)) = args.split_first() else {
            return Err(ExecError::InvalidCommand("empty argument list".to_string()));
        };
        let start = Instant::now();

        debug!(command = %args.join(" "), "executing local command");

        let mut child = Command::new(program)
            .args(rest)
            .env("LC_ALL", "C")
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecError::SpawnError(format!("{program}: {e}")))?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input.as_bytes())
                .await
                .map_err(|e| ExecError::IoError(e.to_string()))?;
            // closing the pipe signals EOF
            drop(pipe);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExecError::IoError(e.to_string()))?;

        let duration = start.elapsed();

        let status = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        debug!(
            command = %program,
            status = status,
            duration = ?duration,
            "command completed"
        );

        if !output.status.success() {
            error!(
                command = %program,
                status = status,
                stderr = %stderr,
                "command failed"
            );
        }

        Ok(CommandResult {
            status,
            stdout,
            stderr,
            duration,
        })
    }
}

#[async_trait]
impl CommandRunner for LocalRunner {
    #[instrument(skip(self, stdin), level = "debug")]
    async fn run(&self, args: &[String], stdin: Option<&str>) -> Result<CommandResult, ExecError> {
        let Some(timeout_duration) = self.timeout else {
            return self.execute(args, stdin).await;
        };

        match timeout(timeout_duration, self.execute(args, stdin)).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    command = %args.join(" "),
                    timeout = ?timeout_duration,
                    "command timed out"
                );
                Err(ExecError::Timeout {
                    timeout: timeout_duration,
                })
            }
        }
    }

    fn runner_type(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn test_run_success() {
        let runner = LocalRunner::new();
        let result = runner.run(&args(&["echo", "hello"]), None).await.unwrap();

        assert!(result.success());
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_failure() {
        let runner = LocalRunner::new();
        let result = runner.run(&args(&["sh", "-c", "exit 42"]), None).await.unwrap();

        assert!(!result.success());
        assert_eq!(result.status, 42);
    }

    #[tokio::test]
    async fn test_run_with_stdin() {
        let runner = LocalRunner::new();
        let result = runner.run(&args(&["cat"]), Some("from stdin")).await.unwrap();

        assert!(result.success());
        assert_eq!(result.stdout, "from stdin");
    }

    #[tokio::test]
    async fn test_run_timeout() {
        let runner = LocalRunner::new().with_timeout(Duration::from_millis(100));
        let result = runner.run(&args(&["sleep", "5"]), None).await;

        assert!(matches!(result, Err(ExecError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_run_empty_args() {
        let runner = LocalRunner::new();
        let result = runner.run(&[], None).await;

        assert!(matches!(result, Err(ExecError::InvalidCommand(_))));
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let runner = LocalRunner::new();
        let result = runner
            .run(&args(&["/nonexistent/hacluster-test-binary"]), None)
            .await;

        assert!(matches!(result, Err(ExecError::SpawnError(_))));
    }
}
