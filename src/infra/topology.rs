//! Cluster topology file — the concrete instance directory.
//!
//! The topology is a YAML document listing nodes and the instances they
//! host. Parsing and cross-reference validation happen at load time, so
//! a malformed document (including an unrecognized node kind) never
//! reaches the orchestrator.
//!
//! ```yaml
//! nodes:
//!   - name: node-a
//!     host: 10.0.0.5
//!     kind: ssh
//!     instances-root: /var/lib/corral/instances
//!     ssh:
//!       user: corral
//! instances:
//!   - name: worker-1
//!     node: node-a
//!     admin-host: 10.0.0.5
//!     admin-port: 4848
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::application::ports::InstanceDirectory;
use crate::domain::cluster::{ClusterMember, Instance, Node, validate_instance_name};
use crate::domain::error::DirectoryError;

/// Errors from loading the cluster topology document.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("cannot read cluster topology {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid cluster topology {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("duplicate node name '{0}' in cluster topology")]
    DuplicateNode(String),

    #[error("duplicate instance name '{0}' in cluster topology")]
    DuplicateInstance(String),

    #[error("instance '{instance}' references unknown node '{node}'")]
    UnknownNode { instance: String, node: String },

    #[error("instance '{0}' has an invalid name")]
    InvalidInstanceName(String),
}

/// Parsed and validated cluster topology.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClusterTopology {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    instances: Vec<Instance>,
}

impl ClusterTopology {
    /// Load and validate a topology file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, fails to parse
    /// (unknown node kinds and unknown fields are parse failures), or
    /// fails cross-reference validation.
    pub fn load(path: &Path) -> Result<Self, TopologyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| TopologyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let topology: Self =
            serde_yaml::from_str(&raw).map_err(|source| TopologyError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        topology.validate()?;
        Ok(topology)
    }

    /// Parse a topology from a YAML string. Used by tests and by `load`.
    ///
    /// # Errors
    ///
    /// Same validation as [`ClusterTopology::load`], minus file I/O.
    pub fn from_yaml(raw: &str) -> Result<Self, TopologyError> {
        let topology: Self =
            serde_yaml::from_str(raw).map_err(|source| TopologyError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?;
        topology.validate()?;
        Ok(topology)
    }

    fn validate(&self) -> Result<(), TopologyError> {
        let mut node_names = HashSet::new();
        for node in &self.nodes {
            if !node_names.insert(node.name.as_str()) {
                return Err(TopologyError::DuplicateNode(node.name.clone()));
            }
        }

        let mut instance_names = HashSet::new();
        for instance in &self.instances {
            if validate_instance_name(&instance.name).is_err() {
                return Err(TopologyError::InvalidInstanceName(instance.name.clone()));
            }
            if !instance_names.insert(instance.name.as_str()) {
                return Err(TopologyError::DuplicateInstance(instance.name.clone()));
            }
            if !node_names.contains(instance.node.as_str()) {
                return Err(TopologyError::UnknownNode {
                    instance: instance.name.clone(),
                    node: instance.node.clone(),
                });
            }
        }
        Ok(())
    }

    fn find(&self, name: &str) -> Option<ClusterMember> {
        let instance = self.instances.iter().find(|i| i.name == name)?;
        let node = self.nodes.iter().find(|n| n.name == instance.node)?;
        Some(ClusterMember {
            instance: instance.clone(),
            node: node.clone(),
        })
    }
}

impl InstanceDirectory for ClusterTopology {
    async fn resolve(&self, name: &str) -> Result<ClusterMember, DirectoryError> {
        self.find(name)
            .ok_or_else(|| DirectoryError::NotFound(name.to_string()))
    }

    async fn names(&self) -> Vec<String> {
        self.instances.iter().map(|i| i.name.clone()).collect()
    }
}

/// Default topology path: `~/.corral/cluster.yaml`. The `--cluster` flag
/// and `CORRAL_CLUSTER` env var (handled by clap) take precedence.
#[must_use]
pub fn default_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".corral")
        .join("cluster.yaml")
}
