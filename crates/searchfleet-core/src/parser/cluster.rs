//! Node-group, exposure and DNS block parsing

use crate::error::{ConfigError, Result};
use crate::model::{DnsSettings, ExposureConfig, MonitorPolicy, NodeGroupConfig};
use kdl::KdlNode;

const DEFAULT_VOLUME_SIZE_GB: u32 = 30;

/// Parse a `master { ... }` or `data { ... }` block.
pub fn parse_node_group(node: &KdlNode, section: &str) -> Result<NodeGroupConfig> {
    let mut group = NodeGroupConfig {
        volume_size_gb: DEFAULT_VOLUME_SIZE_GB,
        ..Default::default()
    };
    let mut count_seen = false;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "count" => {
                    let value = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_integer())
                        .ok_or_else(|| ConfigError::missing(section, "count"))?;
                    if value < 0 {
                        return Err(ConfigError::InvalidSettings(format!(
                            "`{section}` count must not be negative (got {value})"
                        )));
                    }
                    group.count = value as u32;
                    count_seen = true;
                }
                "image" => {
                    group.image = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .unwrap_or("")
                        .to_string();
                }
                "flavor" => {
                    group.flavor = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .unwrap_or("")
                        .to_string();
                }
                "key_pair" | "key-pair" => {
                    group.key_pair = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .unwrap_or("")
                        .to_string();
                }
                "network" => {
                    group.network = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .unwrap_or("")
                        .to_string();
                }
                "security_groups" | "security-groups" => {
                    group.security_groups = child
                        .entries()
                        .iter()
                        .filter_map(|e| e.value().as_string().map(|s| s.to_string()))
                        .collect();
                }
                "volume_size" | "volume-size" => {
                    group.volume_size_gb = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_integer())
                        .map(|v| v as u32)
                        .unwrap_or(DEFAULT_VOLUME_SIZE_GB);
                }
                _ => {}
            }
        }
    }

    if !count_seen {
        return Err(ConfigError::missing(section, "count"));
    }

    Ok(group)
}

/// Parse the `exposure { ... }` block.
pub fn parse_exposure(node: &KdlNode) -> Result<ExposureConfig> {
    let mut exposure = ExposureConfig::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "listener_port" | "listener-port" => {
                    if let Some(v) = child.entries().first().and_then(|e| e.value().as_integer()) {
                        exposure.listener_port = v as u16;
                    }
                }
                "member_port" | "member-port" => {
                    if let Some(v) = child.entries().first().and_then(|e| e.value().as_integer()) {
                        exposure.member_port = v as u16;
                    }
                }
                "monitor" => {
                    exposure.monitor = parse_monitor(child);
                }
                _ => {}
            }
        }
    }

    Ok(exposure)
}

fn parse_monitor(node: &KdlNode) -> MonitorPolicy {
    let mut monitor = MonitorPolicy::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let value = child
                .entries()
                .first()
                .and_then(|e| e.value().as_integer())
                .map(|v| v as u32);
            match (child.name().value(), value) {
                ("delay", Some(v)) => monitor.delay_secs = v,
                ("timeout", Some(v)) => monitor.timeout_secs = v,
                ("max_retries" | "max-retries", Some(v)) => monitor.max_retries = v,
                ("max_retries_down" | "max-retries-down", Some(v)) => monitor.max_retries_down = v,
                _ => {}
            }
        }
    }

    monitor
}

/// Parse the `dns { ... }` block.
pub fn parse_dns(node: &KdlNode) -> Result<DnsSettings> {
    let mut zone = String::new();
    let mut email = String::new();
    let mut ttl = 600;
    let mut record_label = "endpoint".to_string();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "zone" => {
                    zone = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .unwrap_or("")
                        .to_string();
                }
                "email" => {
                    email = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .unwrap_or("")
                        .to_string();
                }
                "ttl" => {
                    if let Some(v) = child.entries().first().and_then(|e| e.value().as_integer()) {
                        ttl = v as u32;
                    }
                }
                "record_label" | "record-label" => {
                    record_label = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .unwrap_or("endpoint")
                        .to_string();
                }
                _ => {}
            }
        }
    }

    if zone.is_empty() {
        return Err(ConfigError::missing("dns", "zone"));
    }

    Ok(DnsSettings {
        zone,
        email,
        ttl,
        record_label,
    })
}
