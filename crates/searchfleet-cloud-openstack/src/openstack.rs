//! openstack CLI wrapper
//!
//! Wraps `openstack ... -f json` invocations for compute, block
//! storage, networking, Octavia and Designate operations. Every call
//! creates or reads exactly one resource; waiting for readiness is
//! delegated to the CLI's own `--wait`.

use crate::error::{OpenStackError, Result};
use searchfleet_cloud::{BlockDevice, ServerSpec};
use serde::Deserialize;
use std::io::Write;
use std::process::Stdio;
use tokio::process::Command;

/// openstack CLI wrapper
pub struct OpenStackCli {
    /// Named cloud from clouds.yaml; the CLI's own config applies when
    /// unset
    cloud: Option<String>,
}

impl OpenStackCli {
    pub fn new(cloud: Option<String>) -> Self {
        Self { cloud }
    }

    /// Run an openstack command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("openstack");
        if let Some(cloud) = &self.cloud {
            cmd.arg("--os-cloud").arg(cloud);
        }
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: openstack {}", args.join(" "));

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OpenStackError::CommandFailed(stderr.to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Check if the CLI is installed and a token can be issued
    pub async fn check_auth(&self) -> Result<TokenInfo> {
        let which = Command::new("which").arg("openstack").output().await?;

        if !which.status.success() {
            return Err(OpenStackError::CliNotFound);
        }

        let output = self
            .run_command(&["token", "issue", "-f", "json"])
            .await
            .map_err(|e| match e {
                OpenStackError::CommandFailed(msg) => OpenStackError::AuthenticationFailed(msg),
                other => other,
            })?;

        let token: TokenInfo = serde_json::from_str(&output)?;
        Ok(token)
    }

    /// Create a block-storage volume
    pub async fn create_volume(&self, name: &str, size_gb: u32) -> Result<IdResponse> {
        let size = size_gb.to_string();
        let output = self
            .run_command(&["volume", "create", "--size", &size, "-f", "json", name])
            .await?;

        Ok(serde_json::from_str(&output)?)
    }

    /// Create a network port
    pub async fn create_port(
        &self,
        name: &str,
        network: &str,
        security_groups: &[String],
    ) -> Result<IdResponse> {
        let mut args = vec!["port", "create", "--network", network];
        for sg in security_groups {
            args.push("--security-group");
            args.push(sg.as_str());
        }
        args.extend(["-f", "json", name]);

        let output = self.run_command(&args).await?;
        Ok(serde_json::from_str(&output)?)
    }

    /// Create a compute instance and wait until it is active.
    ///
    /// The boot payload goes through a temporary file because the CLI
    /// only accepts user data by path.
    pub async fn create_server(&self, spec: &ServerSpec) -> Result<ServerDetail> {
        let mut user_data_file = tempfile::NamedTempFile::new()?;
        user_data_file.write_all(spec.user_data.as_bytes())?;
        let user_data_path = user_data_file.path().to_string_lossy().to_string();

        let block_devices: Vec<String> = spec
            .block_devices
            .iter()
            .map(block_device_arg)
            .collect();

        let mut args = vec![
            "server",
            "create",
            "--image",
            spec.image.as_str(),
            "--flavor",
            spec.flavor.as_str(),
            "--key-name",
            spec.key_pair.as_str(),
            "--port",
            spec.port_id.as_str(),
            "--user-data",
            user_data_path.as_str(),
        ];
        for device in &block_devices {
            args.push("--block-device");
            args.push(device.as_str());
        }
        args.extend(["--wait", "-f", "json", spec.name.as_str()]);

        let output = self.run_command(&args).await?;
        let server: ServerDetail = serde_json::from_str(&output)?;
        Ok(server)
    }

    /// Create an Octavia load balancer and wait for it
    pub async fn create_load_balancer(&self, name: &str, network: &str) -> Result<LoadBalancerDetail> {
        let output = self
            .run_command(&[
                "loadbalancer",
                "create",
                "--name",
                name,
                "--vip-network-id",
                network,
                "--wait",
                "-f",
                "json",
            ])
            .await?;

        Ok(serde_json::from_str(&output)?)
    }

    /// Create a listener on a load balancer
    pub async fn create_listener(
        &self,
        load_balancer_id: &str,
        protocol: &str,
        port: u16,
    ) -> Result<IdResponse> {
        let port = port.to_string();
        let output = self
            .run_command(&[
                "loadbalancer",
                "listener",
                "create",
                "--protocol",
                protocol,
                "--protocol-port",
                &port,
                "--wait",
                "-f",
                "json",
                load_balancer_id,
            ])
            .await?;

        Ok(serde_json::from_str(&output)?)
    }

    /// Create a pool behind a listener
    pub async fn create_pool(
        &self,
        listener_id: &str,
        algorithm: &str,
        protocol: &str,
    ) -> Result<IdResponse> {
        let output = self
            .run_command(&[
                "loadbalancer",
                "pool",
                "create",
                "--listener",
                listener_id,
                "--lb-algorithm",
                algorithm,
                "--protocol",
                protocol,
                "--wait",
                "-f",
                "json",
            ])
            .await?;

        Ok(serde_json::from_str(&output)?)
    }

    /// Add a member to a pool
    pub async fn create_pool_member(
        &self,
        pool_id: &str,
        address: &str,
        port: u16,
    ) -> Result<IdResponse> {
        let port = port.to_string();
        let output = self
            .run_command(&[
                "loadbalancer",
                "member",
                "create",
                "--address",
                address,
                "--protocol-port",
                &port,
                "--wait",
                "-f",
                "json",
                pool_id,
            ])
            .await?;

        Ok(serde_json::from_str(&output)?)
    }

    /// Create a health monitor on a pool
    #[allow(clippy::too_many_arguments)]
    pub async fn create_health_monitor(
        &self,
        pool_id: &str,
        probe: &str,
        delay_secs: u32,
        timeout_secs: u32,
        max_retries: u32,
        max_retries_down: u32,
    ) -> Result<IdResponse> {
        let delay = delay_secs.to_string();
        let timeout = timeout_secs.to_string();
        let retries = max_retries.to_string();
        let retries_down = max_retries_down.to_string();

        let output = self
            .run_command(&[
                "loadbalancer",
                "healthmonitor",
                "create",
                "--delay",
                &delay,
                "--timeout",
                &timeout,
                "--max-retries",
                &retries,
                "--max-retries-down",
                &retries_down,
                "--type",
                probe,
                "--wait",
                "-f",
                "json",
                pool_id,
            ])
            .await?;

        Ok(serde_json::from_str(&output)?)
    }

    /// Find a Designate zone by name
    pub async fn find_zone(&self, name: &str) -> Result<Option<ZoneDetail>> {
        let output = self.run_command(&["zone", "list", "-f", "json"]).await?;

        if output.trim().is_empty() || output.trim() == "[]" {
            return Ok(None);
        }

        let zones: Vec<ZoneDetail> = serde_json::from_str(&output)?;
        Ok(zones.into_iter().find(|z| z.name == name))
    }

    /// Create a Designate zone
    pub async fn create_zone(&self, name: &str, email: &str, ttl: u32) -> Result<ZoneDetail> {
        let ttl = ttl.to_string();
        let output = self
            .run_command(&[
                "zone", "create", "--email", email, "--ttl", &ttl, "-f", "json", name,
            ])
            .await?;

        Ok(serde_json::from_str(&output)?)
    }

    /// Create a recordset in a zone
    pub async fn create_recordset(
        &self,
        zone_id: &str,
        name: &str,
        record_type: &str,
        records: &[String],
        ttl: u32,
    ) -> Result<IdResponse> {
        let ttl = ttl.to_string();
        let mut args = vec!["recordset", "create", "--type", record_type];
        for record in records {
            args.push("--record");
            args.push(record.as_str());
        }
        args.extend(["--ttl", &ttl, "-f", "json", zone_id, name]);

        let output = self.run_command(&args).await?;
        Ok(serde_json::from_str(&output)?)
    }
}

/// Render one `--block-device` argument.
pub(crate) fn block_device_arg(device: &BlockDevice) -> String {
    format!(
        "uuid={},source_type={},destination_type={},boot_index={},delete_on_termination={}",
        device.uuid,
        device.source,
        device.source.destination(),
        device.boot_index,
        device.delete_on_termination
    )
}

/// Pick the first address out of a server's `addresses` field.
///
/// Depending on CLI version this is either a map of network name to a
/// list of addresses (strings or objects with an `addr` key) or the
/// legacy `net=ip, ip2` string.
pub(crate) fn first_address(addresses: &serde_json::Value) -> Option<String> {
    match addresses {
        serde_json::Value::Object(map) => map.values().find_map(|ips| {
            ips.as_array()?.iter().find_map(|ip| {
                ip.as_str().map(str::to_string).or_else(|| {
                    ip.get("addr")
                        .and_then(|a| a.as_str())
                        .map(str::to_string)
                })
            })
        }),
        serde_json::Value::String(s) => s
            .split('=')
            .nth(1)?
            .split(',')
            .next()
            .map(|ip| ip.trim().to_string()),
        _ => None,
    }
}

/// Token information from `openstack token issue`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub id: String,

    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,
}

/// Response carrying only a resource id
#[derive(Debug, Clone, Deserialize)]
pub struct IdResponse {
    pub id: String,
}

/// Server fields the provider cares about
#[derive(Debug, Clone, Deserialize)]
pub struct ServerDetail {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub addresses: serde_json::Value,
}

impl ServerDetail {
    /// Primary address as reported by the provider
    pub fn primary_address(&self) -> Option<String> {
        first_address(&self.addresses)
    }
}

/// Load balancer fields the provider cares about
#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancerDetail {
    pub id: String,

    pub vip_address: String,
}

/// Designate zone fields the provider cares about
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneDetail {
    pub id: String,

    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_device_arg_for_boot_image() {
        let arg = block_device_arg(&BlockDevice::boot_image("img-123"));
        assert_eq!(
            arg,
            "uuid=img-123,source_type=image,destination_type=local,boot_index=0,delete_on_termination=true"
        );
    }

    #[test]
    fn test_block_device_arg_for_data_volume() {
        let arg = block_device_arg(&BlockDevice::data_volume("vol-456"));
        assert_eq!(
            arg,
            "uuid=vol-456,source_type=volume,destination_type=volume,boot_index=1,delete_on_termination=false"
        );
    }

    #[test]
    fn test_first_address_from_map_of_strings() {
        let addresses = serde_json::json!({"private": ["10.0.0.5", "10.0.0.6"]});
        assert_eq!(first_address(&addresses), Some("10.0.0.5".to_string()));
    }

    #[test]
    fn test_first_address_from_map_of_objects() {
        let addresses = serde_json::json!({
            "private": [{"addr": "10.0.0.7", "version": 4}]
        });
        assert_eq!(first_address(&addresses), Some("10.0.0.7".to_string()));
    }

    #[test]
    fn test_first_address_from_legacy_string() {
        let addresses = serde_json::json!("private=10.0.0.8, 10.0.0.9");
        assert_eq!(first_address(&addresses), Some("10.0.0.8".to_string()));
    }

    #[test]
    fn test_first_address_missing() {
        assert_eq!(first_address(&serde_json::json!({})), None);
        assert_eq!(first_address(&serde_json::Value::Null), None);
    }

    #[test]
    fn test_server_detail_parsing() {
        let json = r#"{
            "id": "b84c-1",
            "name": "es-master-0",
            "addresses": {"net-1234": ["10.0.0.12"]},
            "status": "ACTIVE"
        }"#;
        let server: ServerDetail = serde_json::from_str(json).unwrap();

        assert_eq!(server.id, "b84c-1");
        assert_eq!(server.primary_address(), Some("10.0.0.12".to_string()));
    }
}
