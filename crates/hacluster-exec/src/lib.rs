//! hacluster-exec: local process execution
//!
//! Runs the local, non-networked steps of cluster operations (service
//! checks, configuration reloads, certificate tools) and inspects the
//! process environment.

pub mod environment;
pub mod error;
pub mod local;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod result;
pub mod traits;

pub use environment::{proxy_is_set, proxy_set_in_environment};
pub use error::ExecError;
pub use local::LocalRunner;
pub use result::CommandResult;
pub use traits::CommandRunner;
