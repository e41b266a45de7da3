//! Master endpoint exposure
//!
//! Puts the finished master set behind a load balancer: listener, pool,
//! one member per master, and a health monitor. Members are
//! interchangeable; their creation order follows master order but
//! carries no meaning.

use crate::error::{CloudError, Result};
use crate::graph::{BuildGraph, ResourceKind, ResourceNode};
use crate::provider::{
    CloudProvider, LbAlgorithm, ListenerSpec, LoadBalancerSpec, MonitorSpec, PoolMemberSpec,
    PoolSpec, Protocol,
};
use crate::topology::NodeRecord;
use searchfleet_core::ClusterConfig;
use serde::{Deserialize, Serialize};

/// The load-balanced client entrypoint of the cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub load_balancer_id: String,

    /// Stable address clients use regardless of which master serves
    /// the request
    pub vip_address: String,

    pub listener_id: String,
    pub pool_id: String,

    /// One member per master node, in master creation order
    pub member_ids: Vec<String>,

    pub monitor_id: String,
}

/// Expose the complete master set behind a load balancer.
///
/// The caller guarantees `masters` is the final list with every address
/// resolved; anything else is a defect in topology construction and is
/// reported as a topology invariant violation, not a provider error.
pub async fn expose_masters(
    provider: &dyn CloudProvider,
    config: &ClusterConfig,
    masters: &[NodeRecord],
    graph: &mut BuildGraph,
) -> Result<ServiceEndpoint> {
    if masters.is_empty() {
        return Err(CloudError::TopologyInvariant(
            "service exposure requires at least one master node".to_string(),
        ));
    }
    if let Some(node) = masters.iter().find(|m| m.address.is_empty()) {
        return Err(CloudError::TopologyInvariant(format!(
            "master node {} has no resolved address",
            node.index
        )));
    }

    let exposure = &config.exposure;
    let lb_name = format!("{}-master-lb", config.name);

    let lb = provider
        .create_load_balancer(&LoadBalancerSpec {
            name: lb_name.clone(),
            network: config.master.network.clone(),
        })
        .await
        .map_err(|source| CloudError::Provision {
            kind: ResourceKind::LoadBalancer,
            source,
        })?;
    tracing::info!(id = %lb.id, vip = %lb.vip_address, "load balancer created");
    graph.add(ResourceNode::new(&lb.id, ResourceKind::LoadBalancer, lb_name));

    let listener = provider
        .create_listener(&ListenerSpec {
            load_balancer_id: lb.id.clone(),
            protocol: Protocol::Tcp,
            port: exposure.listener_port,
        })
        .await
        .map_err(|source| CloudError::Provision {
            kind: ResourceKind::Listener,
            source,
        })?;
    graph.add(
        ResourceNode::new(&listener.id, ResourceKind::Listener, format!("{}-listener", config.name))
            .with_deps(vec![lb.id.clone()]),
    );

    let pool = provider
        .create_pool(&PoolSpec {
            listener_id: listener.id.clone(),
            algorithm: LbAlgorithm::LeastConnections,
            protocol: Protocol::Tcp,
        })
        .await
        .map_err(|source| CloudError::Provision {
            kind: ResourceKind::Pool,
            source,
        })?;
    graph.add(
        ResourceNode::new(&pool.id, ResourceKind::Pool, format!("{}-pool", config.name))
            .with_deps(vec![listener.id.clone()]),
    );

    let mut member_ids = Vec::with_capacity(masters.len());
    for node in masters {
        let member = provider
            .create_pool_member(&PoolMemberSpec {
                pool_id: pool.id.clone(),
                address: node.address.clone(),
                port: exposure.member_port,
            })
            .await
            .map_err(|source| CloudError::Provision {
                kind: ResourceKind::PoolMember,
                source,
            })?;
        graph.add(
            ResourceNode::new(
                &member.id,
                ResourceKind::PoolMember,
                format!("{}-member-{}", config.name, node.index),
            )
            .with_deps(vec![pool.id.clone(), node.server_id.clone()]),
        );
        member_ids.push(member.id);
    }

    let monitor = provider
        .create_monitor(&MonitorSpec::from_policy(
            pool.id.clone(),
            Protocol::Tcp,
            &exposure.monitor,
        ))
        .await
        .map_err(|source| CloudError::Provision {
            kind: ResourceKind::HealthMonitor,
            source,
        })?;
    graph.add(
        ResourceNode::new(&monitor.id, ResourceKind::HealthMonitor, format!("{}-monitor", config.name))
            .with_deps(vec![pool.id.clone()]),
    );

    Ok(ServiceEndpoint {
        load_balancer_id: lb.id,
        vip_address: lb.vip_address,
        listener_id: listener.id,
        pool_id: pool.id,
        member_ids,
        monitor_id: monitor.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dryrun::DryRunProvider;
    use searchfleet_core::{DnsSettings, ExposureConfig, NodeGroupConfig, NodeRole};

    fn config() -> ClusterConfig {
        ClusterConfig {
            name: "es".to_string(),
            master: NodeGroupConfig {
                count: 2,
                image: "img".to_string(),
                flavor: "f".to_string(),
                key_pair: "k".to_string(),
                network: "net-1234".to_string(),
                security_groups: vec![],
                volume_size_gb: 30,
            },
            data: NodeGroupConfig::default(),
            exposure: ExposureConfig::default(),
            dns: DnsSettings {
                zone: "es.example.net.".to_string(),
                email: "ops@example.net".to_string(),
                ttl: 600,
                record_label: "endpoint".to_string(),
            },
            security_enabled: false,
        }
    }

    fn master(index: u32, address: &str) -> NodeRecord {
        NodeRecord {
            role: NodeRole::Master,
            index,
            server_id: format!("srv-{index}"),
            address: address.to_string(),
            volume_id: format!("vol-{index}"),
            port_id: format!("port-{index}"),
            depends_on: vec![],
        }
    }

    #[tokio::test]
    async fn test_zero_masters_is_an_invariant_violation() {
        let provider = DryRunProvider::new();
        let mut graph = BuildGraph::new();

        let err = expose_masters(&provider, &config(), &[], &mut graph)
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::TopologyInvariant(_)));
        assert!(graph.is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_address_is_an_invariant_violation() {
        let provider = DryRunProvider::new();
        let mut graph = BuildGraph::new();
        let masters = vec![master(0, "10.0.0.1"), master(1, "")];

        let err = expose_masters(&provider, &config(), &masters, &mut graph)
            .await
            .unwrap_err();

        match err {
            CloudError::TopologyInvariant(msg) => assert!(msg.contains("node 1")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(graph.is_empty());
    }

    #[tokio::test]
    async fn test_endpoint_chain_is_recorded_in_graph() {
        let provider = DryRunProvider::new();
        let mut graph = BuildGraph::new();
        let masters = vec![master(0, "10.0.0.1"), master(1, "10.0.0.2")];
        // members point back at their servers; seed the graph with them
        for m in &masters {
            graph.add(ResourceNode::new(&m.server_id, ResourceKind::Server, "m"));
        }

        let endpoint = expose_masters(&provider, &config(), &masters, &mut graph)
            .await
            .unwrap();

        assert_eq!(endpoint.member_ids.len(), 2);
        assert!(graph.is_creation_ordered());
        // lb, listener, pool, 2 members, monitor on top of the seeded servers
        assert_eq!(graph.len(), 8);
    }
}
