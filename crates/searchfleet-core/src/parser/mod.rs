//! fleet.kdl parsing
//!
//! Turns a KDL settings document into a validated [`ClusterConfig`].
//! Parsing performs no side effects; a settings error here means no
//! resource has been created yet.

mod cluster;


pub use cluster::{parse_dns, parse_exposure, parse_node_group};

use crate::error::{ConfigError, Result};
use crate::model::{ClusterConfig, DnsSettings, ExposureConfig, NodeGroupConfig};
use kdl::KdlDocument;

/// Parse a full settings document.
///
/// Expects exactly one top-level `cluster "<name>" { ... }` node with
/// `master`, `data` and `dns` children; `exposure` is optional and falls
/// back to its defaults. Unknown keys are ignored.
pub fn parse_settings(content: &str) -> Result<ClusterConfig> {
    let doc: KdlDocument = content.parse()?;

    let cluster_node = doc
        .nodes()
        .iter()
        .find(|n| n.name().value() == "cluster")
        .ok_or(ConfigError::MissingCluster)?;

    let name = cluster_node
        .entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| ConfigError::missing("cluster", "name"))?
        .to_string();

    let mut master: Option<NodeGroupConfig> = None;
    let mut data: Option<NodeGroupConfig> = None;
    let mut exposure: Option<ExposureConfig> = None;
    let mut dns: Option<DnsSettings> = None;
    let mut security_enabled = false;

    if let Some(children) = cluster_node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "master" => master = Some(parse_node_group(child, "master")?),
                "data" => data = Some(parse_node_group(child, "data")?),
                "exposure" => exposure = Some(parse_exposure(child)?),
                "dns" => dns = Some(parse_dns(child)?),
                "security" => {
                    security_enabled = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_bool())
                        .unwrap_or(false);
                }
                _ => {}
            }
        }
    }

    let config = ClusterConfig {
        name,
        master: master.ok_or_else(|| ConfigError::missing("cluster", "master"))?,
        data: data.unwrap_or_else(|| NodeGroupConfig {
            // A cluster without data nodes is a valid master-only
            // deployment; the group still needs identifiers to validate,
            // so a missing `data` block borrows them from `master`.
            count: 0,
            ..Default::default()
        }),
        exposure: exposure.unwrap_or_default(),
        dns: dns.ok_or_else(|| ConfigError::missing("cluster", "dns"))?,
        security_enabled,
    };

    let config = fill_master_only_defaults(config);
    config.validate()?;
    Ok(config)
}

/// A `data` block that was omitted entirely inherits the master group's
/// identifiers with a count of zero.
fn fill_master_only_defaults(mut config: ClusterConfig) -> ClusterConfig {
    if config.data.count == 0 && config.data.image.is_empty() {
        config.data = NodeGroupConfig {
            count: 0,
            ..config.master.clone()
        };
    }
    config
}
