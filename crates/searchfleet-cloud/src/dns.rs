//! Endpoint DNS binding
//!
//! Declares the zone and points a single A record at the load
//! balancer's virtual IP.

use crate::error::{CloudError, Result};
use crate::exposure::ServiceEndpoint;
use crate::graph::{BuildGraph, ResourceKind, ResourceNode};
use crate::provider::{CloudProvider, DnsRecordSpec, DnsZoneSpec, RecordType};
use searchfleet_core::DnsSettings;
use serde::{Deserialize, Serialize};

/// The cluster's public name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsBinding {
    pub zone_id: String,
    pub record_id: String,

    /// Full record name, `<label>.<zone>`
    pub record_name: String,

    /// Address the record resolves to (the endpoint VIP at bind time)
    pub address: String,

    pub ttl: u32,
}

/// Bind the endpoint's virtual IP under the configured zone.
pub async fn bind_endpoint(
    provider: &dyn CloudProvider,
    dns: &DnsSettings,
    endpoint: &ServiceEndpoint,
    graph: &mut BuildGraph,
) -> Result<DnsBinding> {
    let zone = provider
        .create_dns_zone(&DnsZoneSpec {
            name: dns.zone.clone(),
            email: dns.email.clone(),
            ttl: dns.ttl,
        })
        .await
        .map_err(|source| CloudError::Provision {
            kind: ResourceKind::DnsZone,
            source,
        })?;
    graph.add(ResourceNode::new(&zone.id, ResourceKind::DnsZone, dns.zone.clone()));

    let record_name = dns.record_name();
    tracing::info!(record = %record_name, address = %endpoint.vip_address, "binding endpoint record");

    let record = provider
        .create_dns_record(&DnsRecordSpec {
            zone_id: zone.id.clone(),
            name: record_name.clone(),
            record_type: RecordType::A,
            records: vec![endpoint.vip_address.clone()],
            ttl: dns.ttl,
        })
        .await
        .map_err(|source| CloudError::Provision {
            kind: ResourceKind::DnsRecord,
            source,
        })?;
    graph.add(
        ResourceNode::new(&record.id, ResourceKind::DnsRecord, record_name.clone())
            .with_deps(vec![zone.id.clone(), endpoint.load_balancer_id.clone()]),
    );

    Ok(DnsBinding {
        zone_id: zone.id,
        record_id: record.id,
        record_name,
        address: endpoint.vip_address.clone(),
        ttl: dns.ttl,
    })
}
