//! OpenStack provider implementation

use crate::error::OpenStackError;
use crate::openstack::OpenStackCli;
use async_trait::async_trait;
use searchfleet_cloud::{
    AuthStatus, CloudProvider, Created, CreatedLoadBalancer, CreatedServer, DnsRecordSpec,
    DnsZoneSpec, ListenerSpec, LoadBalancerSpec, MonitorSpec, PoolMemberSpec, PoolSpec, PortSpec,
    ProviderError, ProviderResult, ServerSpec, VolumeSpec,
};

/// OpenStack provider
///
/// Compute and block storage through Nova/Cinder, ports through
/// Neutron, load balancing through Octavia, DNS through Designate.
pub struct OpenStackProvider {
    cli: OpenStackCli,
}

impl OpenStackProvider {
    /// `cloud` selects a named cloud from clouds.yaml; `None` leaves
    /// the choice to the CLI's environment.
    pub fn new(cloud: Option<String>) -> Self {
        Self {
            cli: OpenStackCli::new(cloud),
        }
    }
}

fn provider_err(e: OpenStackError) -> ProviderError {
    ProviderError::new(e.to_string())
}

#[async_trait]
impl CloudProvider for OpenStackProvider {
    fn name(&self) -> &str {
        "openstack"
    }

    fn display_name(&self) -> &str {
        "OpenStack"
    }

    async fn check_auth(&self) -> ProviderResult<AuthStatus> {
        match self.cli.check_auth().await {
            Ok(token) => {
                let account = token
                    .project_id
                    .map(|p| format!("project {p}"))
                    .unwrap_or_else(|| "authenticated".to_string());
                Ok(AuthStatus::ok(account))
            }
            Err(OpenStackError::CliNotFound) => {
                Ok(AuthStatus::failed("openstack CLI is not installed"))
            }
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn create_volume(&self, spec: &VolumeSpec) -> ProviderResult<Created> {
        let volume = self
            .cli
            .create_volume(&spec.name, spec.size_gb)
            .await
            .map_err(provider_err)?;
        tracing::info!(name = %spec.name, id = %volume.id, "volume created");
        Ok(Created::new(volume.id))
    }

    async fn create_port(&self, spec: &PortSpec) -> ProviderResult<Created> {
        let port = self
            .cli
            .create_port(&spec.name, &spec.network, &spec.security_groups)
            .await
            .map_err(provider_err)?;
        tracing::info!(name = %spec.name, id = %port.id, "port created");
        Ok(Created::new(port.id))
    }

    async fn create_server(&self, spec: &ServerSpec) -> ProviderResult<CreatedServer> {
        let server = self.cli.create_server(spec).await.map_err(provider_err)?;

        let address = server
            .primary_address()
            .ok_or_else(|| provider_err(OpenStackError::AddressMissing(server.id.clone())))?;

        tracing::info!(name = %spec.name, id = %server.id, %address, "server active");
        Ok(CreatedServer {
            id: server.id,
            address,
        })
    }

    async fn create_load_balancer(
        &self,
        spec: &LoadBalancerSpec,
    ) -> ProviderResult<CreatedLoadBalancer> {
        let lb = self
            .cli
            .create_load_balancer(&spec.name, &spec.network)
            .await
            .map_err(provider_err)?;
        tracing::info!(name = %spec.name, id = %lb.id, vip = %lb.vip_address, "load balancer created");
        Ok(CreatedLoadBalancer {
            id: lb.id,
            vip_address: lb.vip_address,
        })
    }

    async fn create_listener(&self, spec: &ListenerSpec) -> ProviderResult<Created> {
        let listener = self
            .cli
            .create_listener(
                &spec.load_balancer_id,
                &spec.protocol.to_string(),
                spec.port,
            )
            .await
            .map_err(provider_err)?;
        Ok(Created::new(listener.id))
    }

    async fn create_pool(&self, spec: &PoolSpec) -> ProviderResult<Created> {
        let pool = self
            .cli
            .create_pool(
                &spec.listener_id,
                &spec.algorithm.to_string(),
                &spec.protocol.to_string(),
            )
            .await
            .map_err(provider_err)?;
        Ok(Created::new(pool.id))
    }

    async fn create_pool_member(&self, spec: &PoolMemberSpec) -> ProviderResult<Created> {
        let member = self
            .cli
            .create_pool_member(&spec.pool_id, &spec.address, spec.port)
            .await
            .map_err(provider_err)?;
        Ok(Created::new(member.id))
    }

    async fn create_monitor(&self, spec: &MonitorSpec) -> ProviderResult<Created> {
        let monitor = self
            .cli
            .create_health_monitor(
                &spec.pool_id,
                &spec.probe.to_string(),
                spec.delay_secs,
                spec.timeout_secs,
                spec.max_retries,
                spec.max_retries_down,
            )
            .await
            .map_err(provider_err)?;
        Ok(Created::new(monitor.id))
    }

    async fn create_dns_zone(&self, spec: &DnsZoneSpec) -> ProviderResult<Created> {
        // Declarative: an existing zone under the same name is reused.
        if let Some(zone) = self.cli.find_zone(&spec.name).await.map_err(provider_err)? {
            tracing::debug!(zone = %spec.name, id = %zone.id, "zone already exists");
            return Ok(Created::new(zone.id));
        }

        let zone = self
            .cli
            .create_zone(&spec.name, &spec.email, spec.ttl)
            .await
            .map_err(provider_err)?;
        tracing::info!(zone = %spec.name, id = %zone.id, "zone created");
        Ok(Created::new(zone.id))
    }

    async fn create_dns_record(&self, spec: &DnsRecordSpec) -> ProviderResult<Created> {
        let record = self
            .cli
            .create_recordset(
                &spec.zone_id,
                &spec.name,
                &spec.record_type.to_string(),
                &spec.records,
                spec.ttl,
            )
            .await
            .map_err(provider_err)?;
        tracing::info!(record = %spec.name, id = %record.id, "recordset created");
        Ok(Created::new(record.id))
    }
}
