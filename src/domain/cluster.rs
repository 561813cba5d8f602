//! Cluster topology domain types: instances, nodes, admin endpoints.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::domain::error::{EndpointError, NameError};

/// Valid instance names: lowercase alphanumeric with inner hyphens,
/// 1-63 characters. Same rule the topology file is validated against.
#[allow(clippy::expect_used)]
pub static INSTANCE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").expect("valid regex")
});

/// Validate an instance name before it is resolved against the topology.
///
/// # Errors
///
/// Returns an error if the name does not match [`INSTANCE_NAME_RE`].
pub fn validate_instance_name(name: &str) -> Result<(), NameError> {
    if INSTANCE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(NameError::Invalid(name.to_string()))
    }
}

// ── Instance ──────────────────────────────────────────────────────────────────

/// A named, independently running cluster member process.
///
/// The admin host and port come from the topology document and may be
/// absent there; [`Instance::admin_endpoint`] is the single place that
/// turns the loose record into a usable endpoint or a configuration error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Instance {
    /// Instance identifier, e.g. `"worker-1"`.
    pub name: String,
    /// Name of the node hosting this instance.
    pub node: String,
    /// Host the instance's admin listener binds to.
    #[serde(default)]
    pub admin_host: Option<String>,
    /// Port the instance's admin listener binds to.
    #[serde(default)]
    pub admin_port: Option<u16>,
}

impl Instance {
    /// Resolve the instance's administrative endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error naming the missing field when the topology did not
    /// configure an admin host or port for this instance.
    pub fn admin_endpoint(&self) -> Result<AdminEndpoint, EndpointError> {
        let host = self
            .admin_host
            .as_ref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| EndpointError::MissingHost(self.name.clone()))?;
        let port = self
            .admin_port
            .ok_or_else(|| EndpointError::MissingPort(self.name.clone()))?;
        Ok(AdminEndpoint {
            host: host.clone(),
            port,
        })
    }
}

/// A resolved administrative endpoint: host plus non-zero port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminEndpoint {
    pub host: String,
    pub port: u16,
}

impl std::fmt::Display for AdminEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ── Node ──────────────────────────────────────────────────────────────────────

/// Node locality classification — the sole determinant of which
/// filesystem probe strategy the artifact verifier uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The node is this host; pid files are probed directly.
    Local,
    /// The node is reached over SSH; pid files are probed through a
    /// scoped remote session.
    Ssh,
}

/// SSH session parameters for a remote node.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SshAccess {
    /// Login user. Defaults to the current user when absent.
    #[serde(default)]
    pub user: Option<String>,
    /// SSH port. Defaults to 22 when absent.
    #[serde(default)]
    pub port: Option<u16>,
    /// Identity file passed to `ssh -i`.
    #[serde(default)]
    pub identity: Option<PathBuf>,
}

/// The host description backing one or more instances.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Node {
    /// Node identifier, e.g. `"node-a"`.
    pub name: String,
    /// Reachable host name or address.
    pub host: String,
    /// Locality classification.
    pub kind: NodeKind,
    /// Directory under which each instance keeps its working files.
    pub instances_root: PathBuf,
    /// SSH parameters; only meaningful for [`NodeKind::Ssh`] nodes.
    #[serde(default)]
    pub ssh: Option<SshAccess>,
}

/// An instance together with its owning node, as resolved by the
/// instance directory. Exactly one node per instance.
#[derive(Debug, Clone)]
pub struct ClusterMember {
    pub instance: Instance,
    pub node: Node,
}

/// Path of the pid marker file for an instance on its node.
///
/// The file is created and removed by the instance process itself; this
/// system only ever reads it. Its disappearance is the secondary proof of
/// termination, independent of the instance's self-reported state.
#[must_use]
pub fn pid_file(node: &Node, instance_name: &str) -> PathBuf {
    node.instances_root.join(instance_name).join("instance.pid")
}
