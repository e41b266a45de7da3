//! Cloud provider trait definition
//!
//! Every backend (OpenStack, the dry-run simulator, test doubles)
//! implements this trait to expose the resource primitives the engine
//! builds a cluster from. Each call creates exactly one resource and
//! returns its provider-assigned fields; ordering between calls is the
//! engine's responsibility.

use crate::error::ProviderResult;
use async_trait::async_trait;
use searchfleet_core::MonitorPolicy;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "openstack", "dry-run")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> ProviderResult<AuthStatus>;

    async fn create_volume(&self, spec: &VolumeSpec) -> ProviderResult<Created>;

    async fn create_port(&self, spec: &PortSpec) -> ProviderResult<Created>;

    /// Create a compute instance. Returns only once the provider has
    /// confirmed creation and assigned the primary address.
    async fn create_server(&self, spec: &ServerSpec) -> ProviderResult<CreatedServer>;

    async fn create_load_balancer(
        &self,
        spec: &LoadBalancerSpec,
    ) -> ProviderResult<CreatedLoadBalancer>;

    async fn create_listener(&self, spec: &ListenerSpec) -> ProviderResult<Created>;

    async fn create_pool(&self, spec: &PoolSpec) -> ProviderResult<Created>;

    async fn create_pool_member(&self, spec: &PoolMemberSpec) -> ProviderResult<Created>;

    async fn create_monitor(&self, spec: &MonitorSpec) -> ProviderResult<Created>;

    /// Declarative: a zone that already exists under the same name is
    /// reconciled (reused), not duplicated.
    async fn create_dns_zone(&self, spec: &DnsZoneSpec) -> ProviderResult<Created>;

    async fn create_dns_record(&self, spec: &DnsRecordSpec) -> ProviderResult<Created>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// Provider-assigned identifier of a created resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Created {
    pub id: String,
}

impl Created {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A created compute instance with its confirmed primary address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedServer {
    pub id: String,
    pub address: String,
}

/// A created load balancer with its virtual IP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedLoadBalancer {
    pub id: String,
    pub vip_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeSpec {
    pub name: String,
    pub size_gb: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: String,
    pub network: String,
    pub security_groups: Vec<String>,
}

/// Where a block device's content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockSource {
    Image,
    Volume,
}

impl BlockSource {
    /// Destination the provider materializes the device on.
    pub fn destination(&self) -> &'static str {
        match self {
            BlockSource::Image => "local",
            BlockSource::Volume => "volume",
        }
    }
}

impl std::fmt::Display for BlockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockSource::Image => write!(f, "image"),
            BlockSource::Volume => write!(f, "volume"),
        }
    }
}

/// One entry of a server's block-device list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDevice {
    pub uuid: String,
    pub source: BlockSource,
    pub boot_index: i32,
    pub delete_on_termination: bool,
}

impl BlockDevice {
    /// Boot device backed by the image, discarded with the instance.
    pub fn boot_image(image: impl Into<String>) -> Self {
        Self {
            uuid: image.into(),
            source: BlockSource::Image,
            boot_index: 0,
            delete_on_termination: true,
        }
    }

    /// Attached data volume that outlives the instance.
    pub fn data_volume(volume_id: impl Into<String>) -> Self {
        Self {
            uuid: volume_id.into(),
            source: BlockSource::Volume,
            boot_index: 1,
            delete_on_termination: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSpec {
    pub name: String,
    pub image: String,
    pub flavor: String,
    pub key_pair: String,

    /// Pre-created boot port the instance attaches to
    pub port_id: String,

    /// Boot payload executed on first start
    pub user_data: String,

    pub block_devices: Vec<BlockDevice>,

    /// Server ids that must exist before this one. Advisory for the
    /// provider (the engine has already awaited them); recorded so an
    /// external execution engine sees the same ordering constraint.
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadBalancerSpec {
    pub name: String,
    pub network: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Tcp,
    Http,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "TCP"),
            Protocol::Http => write!(f, "HTTP"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LbAlgorithm {
    LeastConnections,
    RoundRobin,
    SourceIp,
}

impl std::fmt::Display for LbAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LbAlgorithm::LeastConnections => write!(f, "LEAST_CONNECTIONS"),
            LbAlgorithm::RoundRobin => write!(f, "ROUND_ROBIN"),
            LbAlgorithm::SourceIp => write!(f, "SOURCE_IP"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerSpec {
    pub load_balancer_id: String,
    pub protocol: Protocol,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSpec {
    pub listener_id: String,
    pub algorithm: LbAlgorithm,
    pub protocol: Protocol,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolMemberSpec {
    pub pool_id: String,
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSpec {
    pub pool_id: String,
    pub probe: Protocol,
    pub delay_secs: u32,
    pub timeout_secs: u32,
    pub max_retries: u32,
    pub max_retries_down: u32,
}

impl MonitorSpec {
    pub fn from_policy(pool_id: impl Into<String>, probe: Protocol, policy: &MonitorPolicy) -> Self {
        Self {
            pool_id: pool_id.into(),
            probe,
            delay_secs: policy.delay_secs,
            timeout_secs: policy.timeout_secs,
            max_retries: policy.max_retries,
            max_retries_down: policy.max_retries_down,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsZoneSpec {
    pub name: String,
    pub email: String,
    pub ttl: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::Aaaa => write!(f, "AAAA"),
            RecordType::Cname => write!(f, "CNAME"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsRecordSpec {
    pub zone_id: String,
    pub name: String,
    pub record_type: RecordType,
    pub records: Vec<String>,
    pub ttl: u32,
}
