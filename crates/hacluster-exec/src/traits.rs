//! Command runner trait

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::CommandResult;

/// Runs a local program given as an argument vector
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `args[0]` with the remaining arguments, optionally feeding `stdin`
    async fn run(&self, args: &[String], stdin: Option<&str>) -> Result<CommandResult, ExecError>;

    /// Get runner type name
    fn runner_type(&self) -> &'static str;
}
