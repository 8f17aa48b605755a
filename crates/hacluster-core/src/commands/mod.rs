//! Cluster-wide operations
//!
//! Each pipeline runs its steps in order and stops at the first step whose
//! reports contain an error. Steps that already ran are never rolled back.

pub mod booth;
pub mod corosync;
pub mod qdevice;

pub use booth::{BoothConfig, config_sync, pull_config};
pub use corosync::{CorosyncConfPush, push_corosync_conf};
pub use qdevice::{add_device_net, provision_net_certificates, qdevice_client_on_nodes};
