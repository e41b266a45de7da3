//! Cluster and node-group settings

use crate::error::{ConfigError, Result};
use crate::model::{DnsSettings, ExposureConfig};
use serde::{Deserialize, Serialize};

/// Role a node plays inside the search cluster.
///
/// Masters coordinate cluster membership; data nodes hold content and
/// never participate in membership decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Master,
    Data,
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRole::Master => write!(f, "master"),
            NodeRole::Data => write!(f, "data"),
        }
    }
}

/// Resolved cluster definition
///
/// Read-only for the whole run once validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster name, also used as the prefix for every resource name
    pub name: String,

    /// Master node group
    pub master: NodeGroupConfig,

    /// Data node group
    pub data: NodeGroupConfig,

    /// Load-balancer settings for the master endpoint
    #[serde(default)]
    pub exposure: ExposureConfig,

    /// DNS binding for the master endpoint
    pub dns: DnsSettings,

    /// Whether the cluster's own transport/http security layer stays on.
    /// Defaults to off: intra-cluster traffic is expected to run on a
    /// private network that is already protected at the network layer.
    #[serde(default)]
    pub security_enabled: bool,
}

/// Settings for one node group (master or data)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeGroupConfig {
    /// Number of nodes to create
    pub count: u32,

    /// Boot image id or name
    pub image: String,

    /// Compute flavor name
    pub flavor: String,

    /// Key pair name injected into the instance
    pub key_pair: String,

    /// Network the boot port is attached to
    pub network: String,

    /// Security groups applied to the boot port
    pub security_groups: Vec<String>,

    /// Size of the per-node data volume in GB
    pub volume_size_gb: u32,
}

impl ClusterConfig {
    /// Settings for the given role.
    pub fn group(&self, role: NodeRole) -> &NodeGroupConfig {
        match role {
            NodeRole::Master => &self.master,
            NodeRole::Data => &self.data,
        }
    }

    /// Check every field the provisioning run relies on.
    ///
    /// Called by the parser and again by the engine before the first
    /// provider call; a failure here means no resource has been touched.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::missing("cluster", "name"));
        }
        if self.master.count == 0 {
            return Err(ConfigError::NoMasterNodes);
        }
        self.master.validate("master")?;
        self.data.validate("data")?;
        self.dns.validate()?;
        Ok(())
    }
}

impl NodeGroupConfig {
    fn validate(&self, section: &str) -> Result<()> {
        // A group with zero nodes still has to carry valid identifiers;
        // counts may be raised later without touching the rest.
        for (field, value) in [
            ("image", &self.image),
            ("flavor", &self.flavor),
            ("key-pair", &self.key_pair),
            ("network", &self.network),
        ] {
            if value.is_empty() {
                return Err(ConfigError::missing(section, field));
            }
        }
        if self.volume_size_gb == 0 {
            return Err(ConfigError::InvalidSettings(format!(
                "`{section}` volume-size must be at least 1 GB"
            )));
        }
        Ok(())
    }
}
