//! hacluster-report: structured report model
//!
//! Every noteworthy event of a cluster operation is described by a
//! [`ReportItem`]. Items are accumulated by a [`ReportProcessor`], which
//! decides from their severities whether the running operation must stop.

pub mod error;
pub mod item;
pub mod message;
pub mod processor;

pub use error::LibraryError;
pub use item::{ForceCode, Problem, ReportItem, Severity};
pub use message::{ReportCode, ReportMessage, ServiceAction};
pub use processor::{ReportMark, ReportProcessor};
