//! hacluster-core: cluster-wide operations
//!
//! Pipelines in [`commands`] compose remote actions from [`communication`]
//! with local steps from [`local`]. Everything a pipeline needs is owned by
//! one [`LibraryEnvironment`] per invocation.

pub mod commands;
pub mod communication;
pub mod config;
pub mod env;
pub mod error;
pub mod local;
pub mod state;

pub use config::{ClusterConfig, CommunicationConfig, NodeConfig, Settings};
pub use env::LibraryEnvironment;
pub use error::CoreError;
pub use state::{PipelineState, PipelineStep};
