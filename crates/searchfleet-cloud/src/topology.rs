//! Cluster topology construction
//!
//! Materializes the node set for both roles. Master nodes are created
//! strictly one after another: node *i*'s boot payload embeds the
//! confirmed addresses of masters 0..i-1, so creation cannot overlap
//! with any predecessor. Data nodes follow once the full master set
//! exists and may be reordered freely among themselves.

use crate::error::{CloudError, Result};
use crate::graph::{BuildGraph, ResourceKind, ResourceNode};
use crate::provider::{BlockDevice, CloudProvider, PortSpec, ServerSpec, VolumeSpec};
use searchfleet_core::{ClusterConfig, NodeConfig, NodeRole};
use serde::{Deserialize, Serialize};

/// One provisioned node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub role: NodeRole,

    /// 0-based position within the role, assigned at creation time and
    /// never reused
    pub index: u32,

    /// Provider-assigned instance id
    pub server_id: String,

    /// Primary address, confirmed by the provider before the record
    /// exists; immutable afterwards
    pub address: String,

    pub volume_id: String,
    pub port_id: String,

    /// Server ids this node's creation was ordered after
    pub depends_on: Vec<String>,
}

/// The complete node set of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    pub masters: Vec<NodeRecord>,
    pub data_nodes: Vec<NodeRecord>,
}

/// Builds the topology against a provider.
///
/// Owns the node lists while building; nothing else mutates them.
pub struct TopologyBuilder<'a> {
    config: &'a ClusterConfig,
    masters: Vec<NodeRecord>,
    data_nodes: Vec<NodeRecord>,
}

impl<'a> TopologyBuilder<'a> {
    pub fn new(config: &'a ClusterConfig) -> Self {
        Self {
            config,
            masters: Vec::new(),
            data_nodes: Vec::new(),
        }
    }

    /// Create every node of both roles, masters first.
    ///
    /// Aborts on the first provider failure; already-created resources
    /// stay recorded in `graph` for the caller to reconcile.
    pub async fn build(
        mut self,
        provider: &dyn CloudProvider,
        graph: &mut BuildGraph,
    ) -> Result<Topology> {
        for index in 0..self.config.master.count {
            let node = self
                .provision_node(NodeRole::Master, index, provider, graph)
                .await?;
            self.masters.push(node);
        }

        for index in 0..self.config.data.count {
            let node = self
                .provision_node(NodeRole::Data, index, provider, graph)
                .await?;
            self.data_nodes.push(node);
        }

        Ok(Topology {
            masters: self.masters,
            data_nodes: self.data_nodes,
        })
    }

    /// Addresses of every master created so far, in creation order.
    ///
    /// For master node *i* this is exactly nodes 0..i; for data nodes
    /// the complete set, since all masters are finished first.
    fn seed_addresses(&self) -> Vec<String> {
        self.masters.iter().map(|m| m.address.clone()).collect()
    }

    async fn provision_node(
        &self,
        role: NodeRole,
        index: u32,
        provider: &dyn CloudProvider,
        graph: &mut BuildGraph,
    ) -> Result<NodeRecord> {
        let group = self.config.group(role);
        let node_name = format!("{}-{}-{}", self.config.name, role, index);
        tracing::info!(%role, index, "creating node resources");

        let volume_name = format!("{node_name}-data");
        let volume = provider
            .create_volume(&VolumeSpec {
                name: volume_name.clone(),
                size_gb: group.volume_size_gb,
            })
            .await
            .map_err(|source| CloudError::NodeProvision {
                kind: ResourceKind::Volume,
                role,
                index,
                source,
            })?;
        graph.add(ResourceNode::new(&volume.id, ResourceKind::Volume, volume_name));

        let port_name = format!("{node_name}-port");
        let port = provider
            .create_port(&PortSpec {
                name: port_name.clone(),
                network: group.network.clone(),
                security_groups: group.security_groups.clone(),
            })
            .await
            .map_err(|source| CloudError::NodeProvision {
                kind: ResourceKind::Port,
                role,
                index,
                source,
            })?;
        graph.add(ResourceNode::new(&port.id, ResourceKind::Port, port_name));

        // Immutable snapshot; only confirmed addresses ever reach the
        // payload generator.
        let seeds = self.seed_addresses();
        let node_config = NodeConfig::for_role(role, self.config, &seeds);
        let user_data = node_config.render_payload()?;

        // Ordered after every existing master, not only the previous
        // one: the payload above embeds all of their addresses.
        let depends_on: Vec<String> = self.masters.iter().map(|m| m.server_id.clone()).collect();

        let server = provider
            .create_server(&ServerSpec {
                name: node_name.clone(),
                image: group.image.clone(),
                flavor: group.flavor.clone(),
                key_pair: group.key_pair.clone(),
                port_id: port.id.clone(),
                user_data,
                block_devices: vec![
                    BlockDevice::boot_image(&group.image),
                    BlockDevice::data_volume(&volume.id),
                ],
                depends_on: depends_on.clone(),
            })
            .await
            .map_err(|source| CloudError::NodeProvision {
                kind: ResourceKind::Server,
                role,
                index,
                source,
            })?;

        tracing::info!(%role, index, id = %server.id, address = %server.address, "node created");

        let mut deps = vec![volume.id.clone(), port.id.clone()];
        deps.extend(depends_on.iter().cloned());
        graph.add(ResourceNode::new(&server.id, ResourceKind::Server, node_name).with_deps(deps));

        Ok(NodeRecord {
            role,
            index,
            server_id: server.id,
            address: server.address,
            volume_id: volume.id,
            port_id: port.id,
            depends_on,
        })
    }
}
