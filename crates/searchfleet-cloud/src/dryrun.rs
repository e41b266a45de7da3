//! Dry-run provider
//!
//! Fabricates identifiers and addresses without touching any API. Backs
//! `sfleet plan`, where the interesting output is the build graph, and
//! doubles as the provider for engine tests.

use crate::error::ProviderResult;
use crate::graph::ResourceKind;
use crate::provider::{
    AuthStatus, CloudProvider, Created, CreatedLoadBalancer, CreatedServer, DnsRecordSpec,
    DnsZoneSpec, ListenerSpec, LoadBalancerSpec, MonitorSpec, PoolMemberSpec, PoolSpec, PortSpec,
    ServerSpec, VolumeSpec,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Simulated VIP; never routed (TEST-NET-3).
const DRY_RUN_VIP: &str = "203.0.113.80";

#[derive(Default)]
pub struct DryRunProvider {
    counters: Mutex<HashMap<ResourceKind, u32>>,
}

impl DryRunProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self, kind: ResourceKind) -> u32 {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        let n = counters.entry(kind).or_insert(0);
        let current = *n;
        *n += 1;
        current
    }

    fn next_id(&self, kind: ResourceKind) -> String {
        let slug = kind.to_string().replace(' ', "-");
        format!("dry-{}-{}", slug, self.next(kind))
    }
}

#[async_trait]
impl CloudProvider for DryRunProvider {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn display_name(&self) -> &str {
        "Dry run (no resources created)"
    }

    async fn check_auth(&self) -> ProviderResult<AuthStatus> {
        Ok(AuthStatus::ok("dry-run"))
    }

    async fn create_volume(&self, spec: &VolumeSpec) -> ProviderResult<Created> {
        tracing::debug!(name = %spec.name, size_gb = spec.size_gb, "dry-run volume");
        Ok(Created::new(self.next_id(ResourceKind::Volume)))
    }

    async fn create_port(&self, spec: &PortSpec) -> ProviderResult<Created> {
        tracing::debug!(name = %spec.name, network = %spec.network, "dry-run port");
        Ok(Created::new(self.next_id(ResourceKind::Port)))
    }

    async fn create_server(&self, spec: &ServerSpec) -> ProviderResult<CreatedServer> {
        let n = self.next(ResourceKind::Server);
        tracing::debug!(name = %spec.name, deps = spec.depends_on.len(), "dry-run server");
        Ok(CreatedServer {
            id: format!("dry-server-{n}"),
            // Deterministic per-server addresses so seed lists stay
            // inspectable in plan output.
            address: format!("203.0.113.{}", 10 + n),
        })
    }

    async fn create_load_balancer(
        &self,
        spec: &LoadBalancerSpec,
    ) -> ProviderResult<CreatedLoadBalancer> {
        tracing::debug!(name = %spec.name, "dry-run load balancer");
        Ok(CreatedLoadBalancer {
            id: self.next_id(ResourceKind::LoadBalancer),
            vip_address: DRY_RUN_VIP.to_string(),
        })
    }

    async fn create_listener(&self, _spec: &ListenerSpec) -> ProviderResult<Created> {
        Ok(Created::new(self.next_id(ResourceKind::Listener)))
    }

    async fn create_pool(&self, _spec: &PoolSpec) -> ProviderResult<Created> {
        Ok(Created::new(self.next_id(ResourceKind::Pool)))
    }

    async fn create_pool_member(&self, _spec: &PoolMemberSpec) -> ProviderResult<Created> {
        Ok(Created::new(self.next_id(ResourceKind::PoolMember)))
    }

    async fn create_monitor(&self, _spec: &MonitorSpec) -> ProviderResult<Created> {
        Ok(Created::new(self.next_id(ResourceKind::HealthMonitor)))
    }

    async fn create_dns_zone(&self, _spec: &DnsZoneSpec) -> ProviderResult<Created> {
        Ok(Created::new(self.next_id(ResourceKind::DnsZone)))
    }

    async fn create_dns_record(&self, _spec: &DnsRecordSpec) -> ProviderResult<Created> {
        Ok(Created::new(self.next_id(ResourceKind::DnsRecord)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic_ids() {
        let provider = DryRunProvider::new();

        let v0 = provider
            .create_volume(&VolumeSpec {
                name: "v".to_string(),
                size_gb: 30,
            })
            .await
            .unwrap();
        let v1 = provider
            .create_volume(&VolumeSpec {
                name: "v".to_string(),
                size_gb: 30,
            })
            .await
            .unwrap();

        assert_eq!(v0.id, "dry-volume-0");
        assert_eq!(v1.id, "dry-volume-1");
    }

    #[tokio::test]
    async fn test_server_addresses_are_distinct() {
        let provider = DryRunProvider::new();
        let spec = ServerSpec {
            name: "s".to_string(),
            image: "img".to_string(),
            flavor: "f".to_string(),
            key_pair: "k".to_string(),
            port_id: "p".to_string(),
            user_data: String::new(),
            block_devices: vec![],
            depends_on: vec![],
        };

        let a = provider.create_server(&spec).await.unwrap();
        let b = provider.create_server(&spec).await.unwrap();

        assert_ne!(a.address, b.address);
    }
}
