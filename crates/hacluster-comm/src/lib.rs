//! hacluster-comm: multi-node command distribution
//!
//! A [`Target`] is one cluster node with its candidate addresses. The
//! [`NodeCommunicator`] sends one request to one target, walking its
//! addresses on connection failures. A [`CommunicationCommand`] runs a
//! [`RemoteAction`] against a set of targets under a [`RunStrategy`] and
//! folds every per-target outcome into a
//! [`ReportProcessor`](hacluster_report::ReportProcessor).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hacluster_comm::{
//!     CommunicationCommand, CommunicatorSettings, HttpTransport, NodeCommunicator, Target,
//! };
//! # use hacluster_comm::{NodeVerdict, RemoteAction, RequestData, ResponseContext};
//! # struct Ping;
//! # impl RemoteAction for Ping {
//! #     type Output = ();
//! #     fn request(&self) -> RequestData { RequestData::new("remote/check_auth") }
//! #     fn on_success(&self, _: &ResponseContext<'_>, _: &str) -> NodeVerdict<()> {
//! #         NodeVerdict::accepted(())
//! #     }
//! # }
//! use hacluster_report::ReportProcessor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpTransport::new(false)?);
//! let communicator = NodeCommunicator::new(transport, CommunicatorSettings::default());
//! let targets = vec![Target::from_hosts("node1", &["10.0.0.1", "10.0.1.1"], 2224)?];
//!
//! let mut processor = ReportProcessor::new();
//! let output = CommunicationCommand::all(Ping, targets)
//!     .skip_offline_nodes(true)
//!     .run(&communicator, &mut processor)
//!     .await;
//! println!("{:?}", output.verdict);
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod communicator;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod policy;
pub mod request;
pub mod response;
pub mod target;
pub mod transport;

pub use command::{
    CommandOutput, CommunicationCommand, NodeVerdict, RemoteAction, ResponseContext, RunStrategy,
    Verdict,
};
pub use communicator::{CommunicatorSettings, Exchange, NodeCommunicator};
pub use error::CommError;
pub use http::HttpTransport;
pub use policy::{classify, failure_report};
pub use request::RequestData;
pub use response::{CommunicationResult, ErrorClass, ErrorKind, Outcome};
pub use target::{AddressCursor, NodeAddress, Target};
pub use transport::{RawResponse, Transport, TransportError};
