//! Configuration types for the cluster, its nodes and local tools

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use hacluster_comm::{CommError, CommunicatorSettings, Target};

/// Cluster whose nodes operations are distributed to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster name, used when signing quorum device certificates
    #[serde(default)]
    pub name: String,
    /// Cluster nodes
    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeConfig>,
}

/// One cluster node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node name, unique within the cluster
    pub name: String,
    /// Ring addresses in order of preference; the name is used when empty
    #[serde(default)]
    pub addrs: Vec<String>,
}

impl NodeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addrs: Vec::new(),
        }
    }

    /// Set ring addresses
    #[must_use]
    pub fn with_addrs(mut self, addrs: &[&str]) -> Self {
        self.addrs = addrs.iter().map(|a| (*a).to_string()).collect();
        self
    }

    /// Build the communication target for this node
    ///
    /// # Errors
    /// Returns an error if the node ends up without any address.
    pub fn target(&self, port: u16) -> Result<Target, CommError> {
        if self.addrs.is_empty() {
            Target::from_hosts(&self.name, &[&self.name], port)
        } else {
            Target::from_hosts(&self.name, self.addrs.as_slice(), port)
        }
    }
}

/// Node agent communication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicationConfig {
    /// Port the node agent listens on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Timeout of one request to one address
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Optional limit on all attempts against one node
    #[serde(default)]
    pub target_timeout_secs: Option<u64>,
    /// Maximum number of nodes contacted at the same time
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Verify node agent TLS certificates
    #[serde(default)]
    pub verify_tls: bool,
}

impl Default for CommunicationConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            target_timeout_secs: None,
            max_concurrency: default_max_concurrency(),
            verify_tls: false,
        }
    }
}

fn default_port() -> u16 {
    2224
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_concurrency() -> usize {
    16
}

impl CommunicationConfig {
    /// Settings for a `NodeCommunicator`
    #[must_use]
    pub fn communicator_settings(&self) -> CommunicatorSettings {
        let settings = CommunicatorSettings::default()
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_max_concurrency(self.max_concurrency);
        match self.target_timeout_secs {
            Some(secs) => settings.with_target_timeout(Duration::from_secs(secs)),
            None => settings,
        }
    }
}

/// Locations of local tools and files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_corosync_binaries")]
    pub corosync_binaries: PathBuf,
    #[serde(default = "default_systemctl_binary")]
    pub systemctl_binary: PathBuf,
    /// Certificate database of the local quorum device client
    #[serde(default = "default_qdevice_net_client_certs_dir")]
    pub qdevice_net_client_certs_dir: PathBuf,
    #[serde(default = "default_booth_config_dir")]
    pub booth_config_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            corosync_binaries: default_corosync_binaries(),
            systemctl_binary: default_systemctl_binary(),
            qdevice_net_client_certs_dir: default_qdevice_net_client_certs_dir(),
            booth_config_dir: default_booth_config_dir(),
        }
    }
}

fn default_corosync_binaries() -> PathBuf {
    PathBuf::from("/usr/sbin")
}

fn default_systemctl_binary() -> PathBuf {
    PathBuf::from("/bin/systemctl")
}

fn default_qdevice_net_client_certs_dir() -> PathBuf {
    PathBuf::from("/etc/corosync/qdevice/net/nssdb")
}

fn default_booth_config_dir() -> PathBuf {
    PathBuf::from("/etc/booth")
}

impl Settings {
    #[must_use]
    pub fn corosync_cfgtool(&self) -> PathBuf {
        self.corosync_binaries.join("corosync-cfgtool")
    }

    #[must_use]
    pub fn qdevice_net_certutil(&self) -> PathBuf {
        self.corosync_binaries.join("corosync-qdevice-net-certutil")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_target_uses_addrs() {
        let node = NodeConfig::new("node1").with_addrs(&["10.0.0.1", "10.0.1.1"]);
        let target = node.target(2224).unwrap();

        assert_eq!(target.label(), "node1");
        let hosts: Vec<_> = target.address_list().iter().map(|a| a.host.as_str()).collect();
        assert_eq!(hosts, vec!["10.0.0.1", "10.0.1.1"]);
    }

    #[test]
    fn test_node_target_falls_back_to_name() {
        let target = NodeConfig::new("node1").target(2224).unwrap();
        assert_eq!(target.address_list()[0].host, "node1");
        assert_eq!(target.address_list()[0].port, 2224);
    }

    #[test]
    fn test_communicator_settings() {
        let config = CommunicationConfig {
            target_timeout_secs: Some(90),
            max_concurrency: 0,
            ..CommunicationConfig::default()
        };
        let settings = config.communicator_settings();

        assert_eq!(settings.request_timeout, Duration::from_secs(60));
        assert_eq!(settings.target_timeout, Some(Duration::from_secs(90)));
        assert_eq!(settings.max_concurrency, 1);
    }

    #[test]
    fn test_settings_paths() {
        let settings = Settings::default();
        assert_eq!(
            settings.qdevice_net_certutil(),
            PathBuf::from("/usr/sbin/corosync-qdevice-net-certutil")
        );
    }
}
