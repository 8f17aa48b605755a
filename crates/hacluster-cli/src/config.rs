//! Configuration loading and types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hacluster_core::{ClusterConfig, CommunicationConfig, NodeConfig, Settings};

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "HACLUSTER_CONFIG";

/// Errors reading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read
    #[error("unable to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for [`Config`]
    #[error("unable to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration of the `hacluster` tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Node agent communication
    #[serde(default)]
    pub communication: CommunicationConfig,
    /// Cluster identity
    #[serde(default)]
    pub cluster: ClusterSection,
    /// Cluster nodes
    #[serde(default)]
    pub node: Vec<NodeConfig>,
    /// Local tool locations
    #[serde(default)]
    pub settings: Settings,
}

/// `[cluster]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterSection {
    #[serde(default)]
    pub name: String,
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit`, else the first existing default location, else defaults
    ///
    /// # Errors
    /// Returns error if the chosen file cannot be read or parsed
    pub fn load_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }

        let paths = [
            Some(PathBuf::from("hacluster.toml")),
            Some(PathBuf::from("/etc/hacluster/hacluster.toml")),
            dirs::config_dir().map(|p| p.join("hacluster/hacluster.toml")),
        ];
        for path in paths.into_iter().flatten() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::load(&path);
            }
        }

        tracing::warn!("no config file found, using defaults");
        Ok(Config::default())
    }

    /// Cluster and its nodes as the library expects them
    #[must_use]
    pub fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig {
            name: self.cluster.name.clone(),
            nodes: self.node.clone(),
        }
    }
}
