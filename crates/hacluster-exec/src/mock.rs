//! Scripted command runner for tests

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::CommandResult;
use crate::traits::CommandRunner;

#[derive(Debug)]
struct Expected {
    args: Vec<String>,
    stdin: Option<String>,
    result: Result<CommandResult, ExecError>,
}

/// Runner that replays expected invocations in order
///
/// Every call must match the next queued expectation exactly; a mismatch or
/// an unexpected call panics with a description of both sides.
#[derive(Debug, Default)]
pub struct MockRunner {
    expected: Mutex<VecDeque<Expected>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockRunner {
    /// Create a runner expecting no calls
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect `args` and answer with the given output
    #[must_use]
    pub fn expect(self, args: &[&str], status: i32, stdout: &str, stderr: &str) -> Self {
        self.push(args, None, Ok(CommandResult::new(status, stdout, stderr)))
    }

    /// Expect `args` with `stdin` and answer with the given output
    #[must_use]
    pub fn expect_with_stdin(self, args: &[&str], stdin: &str, status: i32, stdout: &str) -> Self {
        self.push(
            args,
            Some(stdin.to_string()),
            Ok(CommandResult::new(status, stdout, "")),
        )
    }

    /// Expect `args` and fail to run them
    #[must_use]
    pub fn expect_error(self, args: &[&str], error: ExecError) -> Self {
        self.push(args, None, Err(error))
    }

    fn push(
        self,
        args: &[&str],
        stdin: Option<String>,
        result: Result<CommandResult, ExecError>,
    ) -> Self {
        self.expected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Expected {
                args: args.iter().map(|s| (*s).to_string()).collect(),
                stdin,
                result,
            });
        self
    }

    /// Argument vectors of every call made so far
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of expectations not consumed yet
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.expected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, args: &[String], stdin: Option<&str>) -> Result<CommandResult, ExecError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(args.to_vec());

        let next = self
            .expected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let Some(expected) = next else {
            panic!("unexpected command: {args:?}");
        };
        assert_eq!(expected.args, args, "command arguments differ");
        assert_eq!(expected.stdin.as_deref(), stdin, "command stdin differs");
        expected.result
    }

    fn runner_type(&self) -> &'static str {
        "mock"
    }
}
