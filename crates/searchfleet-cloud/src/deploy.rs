//! One-shot deployment driver
//!
//! Runs the single forward pass: topology, then exposure, then DNS.
//! There is no feedback loop and no re-entrancy; a run either describes
//! the full cluster or stops at the first failure.

use crate::dns::{DnsBinding, bind_endpoint};
use crate::error::Result;
use crate::exposure::{ServiceEndpoint, expose_masters};
use crate::graph::BuildGraph;
use crate::provider::CloudProvider;
use crate::topology::{Topology, TopologyBuilder};
use searchfleet_core::ClusterConfig;
use serde::{Deserialize, Serialize};

/// Everything one run constructs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub topology: Topology,
    pub endpoint: ServiceEndpoint,
    pub dns: DnsBinding,
    pub graph: BuildGraph,
}

/// Build the complete cluster.
///
/// Settings are validated before the first provider call, so a settings
/// error is guaranteed to leave the cloud untouched.
pub async fn deploy(provider: &dyn CloudProvider, config: &ClusterConfig) -> Result<Deployment> {
    config.validate()?;

    tracing::info!(
        cluster = %config.name,
        masters = config.master.count,
        data_nodes = config.data.count,
        provider = provider.name(),
        "building cluster topology"
    );

    let mut graph = BuildGraph::new();
    let topology = TopologyBuilder::new(config)
        .build(provider, &mut graph)
        .await?;
    let endpoint = expose_masters(provider, config, &topology.masters, &mut graph).await?;
    let dns = bind_endpoint(provider, &config.dns, &endpoint, &mut graph).await?;

    tracing::info!(
        resources = graph.len(),
        vip = %endpoint.vip_address,
        record = %dns.record_name,
        "cluster construction complete"
    );

    Ok(Deployment {
        topology,
        endpoint,
        dns,
        graph,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CloudError, ProviderError, ProviderResult};
    use crate::graph::ResourceKind;
    use crate::provider::*;
    use async_trait::async_trait;
    use searchfleet_core::{
        ClusterConfig, ConfigError, DnsSettings, ExposureConfig, NodeGroupConfig, NodeRole,
    };
    use std::sync::Mutex;

    fn group(count: u32) -> NodeGroupConfig {
        NodeGroupConfig {
            count,
            image: "ubuntu-22.04".to_string(),
            flavor: "m1.large".to_string(),
            key_pair: "ops".to_string(),
            network: "net-1234".to_string(),
            security_groups: vec!["sg-es".to_string()],
            volume_size_gb: 30,
        }
    }

    fn config(masters: u32, data: u32) -> ClusterConfig {
        ClusterConfig {
            name: "es".to_string(),
            master: group(masters),
            data: group(data),
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

    /// Records every spec it receives and fabricates deterministic
    /// responses: server N gets id `srv-N` and address `10.1.0.N+1`.
    #[derive(Default)]
    struct RecordingProvider {
        inner: Mutex<Recorded>,
    }

    #[derive(Default)]
    struct Recorded {
        volumes: Vec<VolumeSpec>,
        ports: Vec<PortSpec>,
        servers: Vec<ServerSpec>,
        load_balancers: Vec<LoadBalancerSpec>,
        listeners: Vec<ListenerSpec>,
        pools: Vec<PoolSpec>,
        members: Vec<PoolMemberSpec>,
        monitors: Vec<MonitorSpec>,
        zones: Vec<DnsZoneSpec>,
        records: Vec<DnsRecordSpec>,
    }

    impl RecordingProvider {
        fn new() -> Self {
            Self::default()
        }

        fn total_calls(&self) -> usize {
            let r = self.inner.lock().unwrap();
            r.volumes.len()
                + r.ports.len()
                + r.servers.len()
                + r.load_balancers.len()
                + r.listeners.len()
                + r.pools.len()
                + r.members.len()
                + r.monitors.len()
                + r.zones.len()
                + r.records.len()
        }

        fn servers(&self) -> Vec<ServerSpec> {
            self.inner.lock().unwrap().servers.clone()
        }

        fn members(&self) -> Vec<PoolMemberSpec> {
            self.inner.lock().unwrap().members.clone()
        }

        fn records(&self) -> Vec<DnsRecordSpec> {
            self.inner.lock().unwrap().records.clone()
        }
    }

    #[async_trait]
    impl CloudProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        fn display_name(&self) -> &str {
            "Recording test provider"
        }

        async fn check_auth(&self) -> ProviderResult<AuthStatus> {
            Ok(AuthStatus::ok("test"))
        }

        async fn create_volume(&self, spec: &VolumeSpec) -> ProviderResult<Created> {
            let mut r = self.inner.lock().unwrap();
            r.volumes.push(spec.clone());
            Ok(Created::new(format!("vol-{}", r.volumes.len() - 1)))
        }

        async fn create_port(&self, spec: &PortSpec) -> ProviderResult<Created> {
            let mut r = self.inner.lock().unwrap();
            r.ports.push(spec.clone());
            Ok(Created::new(format!("port-{}", r.ports.len() - 1)))
        }

        async fn create_server(&self, spec: &ServerSpec) -> ProviderResult<CreatedServer> {
            let mut r = self.inner.lock().unwrap();
            let n = r.servers.len();
            r.servers.push(spec.clone());
            Ok(CreatedServer {
                id: format!("srv-{n}"),
                address: format!("10.1.0.{}", n + 1),
            })
        }

        async fn create_load_balancer(
            &self,
            spec: &LoadBalancerSpec,
        ) -> ProviderResult<CreatedLoadBalancer> {
            let mut r = self.inner.lock().unwrap();
            r.load_balancers.push(spec.clone());
            Ok(CreatedLoadBalancer {
                id: "lb-0".to_string(),
                vip_address: "10.1.0.250".to_string(),
            })
        }

        async fn create_listener(&self, spec: &ListenerSpec) -> ProviderResult<Created> {
            let mut r = self.inner.lock().unwrap();
            r.listeners.push(spec.clone());
            Ok(Created::new("listener-0"))
        }

        async fn create_pool(&self, spec: &PoolSpec) -> ProviderResult<Created> {
            let mut r = self.inner.lock().unwrap();
            r.pools.push(spec.clone());
            Ok(Created::new("pool-0"))
        }

        async fn create_pool_member(&self, spec: &PoolMemberSpec) -> ProviderResult<Created> {
            let mut r = self.inner.lock().unwrap();
            r.members.push(spec.clone());
            Ok(Created::new(format!("member-{}", r.members.len() - 1)))
        }

        async fn create_monitor(&self, spec: &MonitorSpec) -> ProviderResult<Created> {
            let mut r = self.inner.lock().unwrap();
            r.monitors.push(spec.clone());
            Ok(Created::new("monitor-0"))
        }

        async fn create_dns_zone(&self, spec: &DnsZoneSpec) -> ProviderResult<Created> {
            let mut r = self.inner.lock().unwrap();
            r.zones.push(spec.clone());
            Ok(Created::new("zone-0"))
        }

        async fn create_dns_record(&self, spec: &DnsRecordSpec) -> ProviderResult<Created> {
            let mut r = self.inner.lock().unwrap();
            r.records.push(spec.clone());
            Ok(Created::new("record-0"))
        }
    }

    #[tokio::test]
    async fn test_node_counts_and_ordinals() {
        let provider = RecordingProvider::new();
        let deployment = deploy(&provider, &config(3, 2)).await.unwrap();

        let masters = &deployment.topology.masters;
        let data = &deployment.topology.data_nodes;
        assert_eq!(masters.len(), 3);
        assert_eq!(data.len(), 2);

        for (i, node) in masters.iter().enumerate() {
            assert_eq!(node.index, i as u32);
            assert_eq!(node.role, NodeRole::Master);
        }
        for (i, node) in data.iter().enumerate() {
            assert_eq!(node.index, i as u32);
            assert_eq!(node.role, NodeRole::Data);
        }

        // 5 volumes + 5 ports + 5 servers + lb + listener + pool
        // + 3 members + monitor + zone + record
        assert_eq!(deployment.graph.len(), 24);
    }

    #[tokio::test]
    async fn test_master_seed_lists_grow_in_creation_order() {
        let provider = RecordingProvider::new();
        deploy(&provider, &config(3, 0)).await.unwrap();

        let servers = provider.servers();
        assert_eq!(servers.len(), 3);

        // first master: self only, plus the one-time bootstrap directive
        assert!(servers[0].user_data.contains("discovery.seed_hosts: [$(curl"));
        assert!(servers[0].user_data.contains("cluster.initial_master_nodes"));

        // later masters: all predecessors in order, then self; no bootstrap
        assert!(
            servers[1]
                .user_data
                .contains("discovery.seed_hosts: [10.1.0.1,$(curl")
        );
        assert!(!servers[1].user_data.contains("cluster.initial_master_nodes"));

        assert!(
            servers[2]
                .user_data
                .contains("discovery.seed_hosts: [10.1.0.1,10.1.0.2,$(curl")
        );
        assert!(!servers[2].user_data.contains("cluster.initial_master_nodes"));
    }

    #[tokio::test]
    async fn test_master_dependency_chain_covers_all_predecessors() {
        let provider = RecordingProvider::new();
        deploy(&provider, &config(3, 0)).await.unwrap();

        let servers = provider.servers();
        assert!(servers[0].depends_on.is_empty());
        assert_eq!(servers[1].depends_on, vec!["srv-0"]);
        assert_eq!(servers[2].depends_on, vec!["srv-0", "srv-1"]);
    }

    #[tokio::test]
    async fn test_data_nodes_depend_on_full_master_set() {
        let provider = RecordingProvider::new();
        deploy(&provider, &config(3, 2)).await.unwrap();

        let servers = provider.servers();
        for data_server in &servers[3..] {
            assert_eq!(data_server.depends_on, vec!["srv-0", "srv-1", "srv-2"]);
            assert!(
                data_server
                    .user_data
                    .contains("discovery.seed_hosts: [10.1.0.1,10.1.0.2,10.1.0.3]")
            );
            assert!(data_server.user_data.contains("node.roles: [\"data\"]"));
            assert!(!data_server.user_data.contains("cluster.initial_master_nodes"));
        }
    }

    #[tokio::test]
    async fn test_single_master_bootstraps_without_dependencies() {
        let provider = RecordingProvider::new();
        let deployment = deploy(&provider, &config(1, 0)).await.unwrap();

        let servers = provider.servers();
        assert_eq!(servers.len(), 1);
        assert!(servers[0].depends_on.is_empty());
        assert!(servers[0].user_data.contains("cluster.initial_master_nodes"));
        assert_eq!(deployment.endpoint.member_ids.len(), 1);
    }

    #[tokio::test]
    async fn test_one_pool_member_per_master_at_client_port() {
        let provider = RecordingProvider::new();
        let deployment = deploy(&provider, &config(3, 2)).await.unwrap();

        let members = provider.members();
        assert_eq!(members.len(), 3);
        let master_addresses: Vec<&str> = deployment
            .topology
            .masters
            .iter()
            .map(|m| m.address.as_str())
            .collect();
        for (member, address) in members.iter().zip(master_addresses) {
            assert_eq!(member.address, address);
            assert_eq!(member.port, 9200);
            assert_eq!(member.pool_id, deployment.endpoint.pool_id);
        }
    }

    #[tokio::test]
    async fn test_dns_record_points_at_vip() {
        let provider = RecordingProvider::new();
        let deployment = deploy(&provider, &config(2, 0)).await.unwrap();

        let records = provider.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].records, vec!["10.1.0.250"]);
        assert_eq!(records[0].name, "endpoint.es.example.net.");
        assert_eq!(deployment.dns.address, deployment.endpoint.vip_address);
    }

    #[tokio::test]
    async fn test_zero_masters_rejected_before_any_provider_call() {
        let provider = RecordingProvider::new();
        let err = deploy(&provider, &config(0, 2)).await.unwrap_err();

        assert!(matches!(
            err,
            CloudError::Config(ConfigError::NoMasterNodes)
        ));
        assert_eq!(provider.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_graph_is_a_topological_order_of_itself() {
        let provider = RecordingProvider::new();
        let deployment = deploy(&provider, &config(3, 2)).await.unwrap();
        assert!(deployment.graph.is_creation_ordered());
    }

    /// Fails the Nth volume creation; everything else succeeds.
    struct FailingProvider {
        fail_on_volume: usize,
        volumes: Mutex<usize>,
        servers: Mutex<usize>,
    }

    impl FailingProvider {
        fn new(fail_on_volume: usize) -> Self {
            Self {
                fail_on_volume,
                volumes: Mutex::new(0),
                servers: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl CloudProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn display_name(&self) -> &str {
            "Failing test provider"
        }

        async fn check_auth(&self) -> ProviderResult<AuthStatus> {
            Ok(AuthStatus::ok("test"))
        }

        async fn create_volume(&self, _spec: &VolumeSpec) -> ProviderResult<Created> {
            let mut n = self.volumes.lock().unwrap();
            let current = *n;
            *n += 1;
            if current == self.fail_on_volume {
                return Err(ProviderError::new("quota exceeded"));
            }
            Ok(Created::new(format!("vol-{current}")))
        }

        async fn create_port(&self, _spec: &PortSpec) -> ProviderResult<Created> {
            Ok(Created::new("port-x"))
        }

        async fn create_server(&self, _spec: &ServerSpec) -> ProviderResult<CreatedServer> {
            let mut n = self.servers.lock().unwrap();
            let current = *n;
            *n += 1;
            Ok(CreatedServer {
                id: format!("srv-{current}"),
                address: format!("10.9.0.{}", current + 1),
            })
        }

        async fn create_load_balancer(
            &self,
            _spec: &LoadBalancerSpec,
        ) -> ProviderResult<CreatedLoadBalancer> {
            Ok(CreatedLoadBalancer {
                id: "lb-0".to_string(),
                vip_address: "10.9.0.250".to_string(),
            })
        }

        async fn create_listener(&self, _spec: &ListenerSpec) -> ProviderResult<Created> {
            Ok(Created::new("listener-0"))
        }

        async fn create_pool(&self, _spec: &PoolSpec) -> ProviderResult<Created> {
            Ok(Created::new("pool-0"))
        }

        async fn create_pool_member(&self, _spec: &PoolMemberSpec) -> ProviderResult<Created> {
            Ok(Created::new("member-x"))
        }

        async fn create_monitor(&self, _spec: &MonitorSpec) -> ProviderResult<Created> {
            Ok(Created::new("monitor-0"))
        }

        async fn create_dns_zone(&self, _spec: &DnsZoneSpec) -> ProviderResult<Created> {
            Ok(Created::new("zone-0"))
        }

        async fn create_dns_record(&self, _spec: &DnsRecordSpec) -> ProviderResult<Created> {
            Ok(Created::new("record-0"))
        }
    }

    #[tokio::test]
    async fn test_provider_failure_carries_kind_role_and_index() {
        // volumes 0..2 belong to the masters; volume 3 is data node 0
        let provider = FailingProvider::new(3);
        let err = deploy(&provider, &config(3, 2)).await.unwrap_err();

        match err {
            CloudError::NodeProvision {
                kind,
                role,
                index,
                source,
            } => {
                assert_eq!(kind, ResourceKind::Volume);
                assert_eq!(role, NodeRole::Data);
                assert_eq!(index, 0);
                assert!(source.to_string().contains("quota exceeded"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_failure_keeps_already_created_resources_in_graph() {
        let provider = FailingProvider::new(3);
        let cfg = config(3, 2);
        let mut graph = BuildGraph::new();

        let result = TopologyBuilder::new(&cfg).build(&provider, &mut graph).await;
        assert!(result.is_err());

        // three complete masters (volume + port + server each), nothing
        // for the failed data node
        assert_eq!(graph.len(), 9);
        assert!(graph.is_creation_ordered());
    }
}
