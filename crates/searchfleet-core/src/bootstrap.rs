//! Node bootstrap payload generation
//!
//! Builds the per-node boot payload: package installation, data-volume
//! mount, kernel tuning, and the role-specific cluster config file. The
//! directive set is typed and inspectable; text is produced only at the
//! payload boundary.

use crate::error::{ConfigError, Result};
use crate::model::{ClusterConfig, NodeRole};
use serde::Serialize;

/// Shell substitutions the instance resolves against the metadata
/// service at boot. Addresses of not-yet-created nodes can never appear
/// in a payload; a node only ever refers to itself this way.
const SELF_ADDRESS: &str = "$(curl 169.254.169.254/2009-04-04/meta-data/local-ipv4)";
const SELF_HOSTNAME: &str = "$(curl 169.254.169.254/2009-04-04/meta-data/hostname)";

const MAX_MAP_COUNT: u32 = 262144;

/// One entry in the discovery seed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SeedHost {
    /// Confirmed address of an already-created master node.
    Address(String),

    /// Placeholder the node resolves to its own address at boot.
    SelfAddress,
}

impl SeedHost {
    fn render(&self) -> &str {
        match self {
            SeedHost::Address(addr) => addr,
            SeedHost::SelfAddress => SELF_ADDRESS,
        }
    }
}

/// Storage layout for a node's data volume.
#[derive(Debug, Clone, Serialize)]
pub struct StorageDirectives {
    /// Block device the data volume shows up as
    pub device: String,

    /// Filesystem created on first boot if the device is unformatted
    pub filesystem: String,

    /// Mount target, doubling as the service data path
    pub mount_target: String,

    /// Service user owning the mount
    pub owner: String,
}

impl StorageDirectives {
    /// Layout for the given role. Both roles currently share the same
    /// layout; data nodes may grow a separate one without touching
    /// callers.
    pub fn for_role(_role: NodeRole) -> Self {
        Self {
            device: "/dev/vdb".to_string(),
            filesystem: "xfs".to_string(),
            mount_target: "/var/lib/elasticsearch".to_string(),
            owner: "elasticsearch".to_string(),
        }
    }
}

/// Typed cluster-config directives for one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeConfig {
    pub cluster_name: String,
    pub role: NodeRole,

    /// Ordered discovery seed list
    pub seed_hosts: Vec<SeedHost>,

    /// One-time declaration allowing this node to form a new cluster
    /// from scratch. Set for exactly one node generation (the very
    /// first master); a second bootstrap attempt would split the
    /// cluster.
    pub bootstrap_initial_masters: bool,

    /// Client port the node listens on
    pub http_port: u16,

    /// Whether the built-in transport/http security layer stays enabled
    pub security_enabled: bool,

    pub storage: StorageDirectives,
}

impl NodeConfig {
    /// Generate the directives for one node.
    ///
    /// `seed_addresses` must contain only confirmed addresses, in
    /// creation order: for master node *i* the addresses of masters
    /// 0..i-1 (empty for the first), for data nodes the complete master
    /// set. Pure over its inputs; the caller guarantees the addresses
    /// are real.
    pub fn for_role(role: NodeRole, config: &ClusterConfig, seed_addresses: &[String]) -> Self {
        let mut seed_hosts: Vec<SeedHost> = seed_addresses
            .iter()
            .cloned()
            .map(SeedHost::Address)
            .collect();

        let bootstrap_initial_masters = match role {
            NodeRole::Master => {
                // A joining master discovers the existing cluster through
                // the seeds and contributes its own address for later
                // nodes. Only the very first master, with nobody to
                // join, may bootstrap.
                seed_hosts.push(SeedHost::SelfAddress);
                seed_addresses.is_empty()
            }
            NodeRole::Data => false,
        };

        Self {
            cluster_name: config.name.clone(),
            role,
            seed_hosts,
            bootstrap_initial_masters,
            http_port: config.exposure.member_port,
            security_enabled: config.security_enabled,
            storage: StorageDirectives::for_role(role),
        }
    }

    /// Render the cluster config file content (the `elasticsearch.yml`
    /// body placed by the payload).
    pub fn cluster_directives(&self) -> String {
        let seeds = self
            .seed_hosts
            .iter()
            .map(SeedHost::render)
            .collect::<Vec<_>>()
            .join(",");

        let mut out = String::new();
        out.push_str(&format!("cluster.name: {}\n", self.cluster_name));
        out.push_str(&format!("node.name: {SELF_HOSTNAME}\n"));
        out.push_str(&format!("path.data: {}\n", self.storage.mount_target));
        out.push_str("path.logs: /var/log/elasticsearch\n");
        out.push_str(&format!("network.host: {SELF_ADDRESS}\n"));
        out.push_str(&format!("http.port: {}\n", self.http_port));
        out.push_str(&format!("discovery.seed_hosts: [{seeds}]\n"));
        if self.bootstrap_initial_masters {
            out.push_str(&format!("cluster.initial_master_nodes: [{SELF_ADDRESS}]\n"));
        }
        if !self.security_enabled {
            out.push_str("xpack.security.enabled: false\n");
            out.push_str("xpack.security.transport.ssl.enabled: false\n");
            out.push_str("xpack.security.http.ssl.enabled: false\n");
        }
        out.push_str("http.host: 0.0.0.0\n");
        out.push_str(&format!("node.roles: [\"{}\"]\n", self.role));
        out
    }

    /// Render the complete boot payload handed to the compute instance.
    pub fn render_payload(&self) -> Result<String> {
        let mut ctx = tera::Context::new();
        ctx.insert("device", &self.storage.device);
        ctx.insert("filesystem", &self.storage.filesystem);
        ctx.insert("mount_target", &self.storage.mount_target);
        ctx.insert("owner", &self.storage.owner);
        ctx.insert("max_map_count", &MAX_MAP_COUNT);
        ctx.insert("directives", &self.cluster_directives());

        tera::Tera::one_off(PAYLOAD_TEMPLATE, &ctx, false)
            .map_err(|e| ConfigError::TemplateRender(e.to_string()))
    }
}

/// Boot payload skeleton. Package installation and OS preparation come
/// before the config file so a restart always sees a mounted data path.
const PAYLOAD_TEMPLATE: &str = r#"#!/bin/sh
export DEBIAN_FRONTEND=noninteractive

# install elasticsearch
wget -qO - https://artifacts.elastic.co/GPG-KEY-elasticsearch | gpg --dearmor -o /usr/share/keyrings/elasticsearch-keyring.gpg
apt-get update && apt-get install -y apt-transport-https
echo "deb [signed-by=/usr/share/keyrings/elasticsearch-keyring.gpg] https://artifacts.elastic.co/packages/8.x/apt stable main" | tee /etc/apt/sources.list.d/elastic-8.x.list
apt-get update && apt-get install -y elasticsearch

# mount data volume
lsblk -f {{ device }} | grep {{ filesystem }} > /dev/null
if [ $? -ne 0 ] ; then
    mkfs -t {{ filesystem }} {{ device }}
fi
echo '{{ device }} {{ mount_target }} {{ filesystem }} defaults 0 0' >> /etc/fstab
mount -a
chown {{ owner }}:{{ owner }} {{ mount_target }}

# kernel parameter tune
echo vm.max_map_count={{ max_map_count }} > /etc/sysctl.d/90-elasticsearch.conf
sysctl --system

# place cluster config file
cat << EOF > /etc/elasticsearch/elasticsearch.yml
{{ directives }}EOF
chown {{ owner }}:{{ owner }} /etc/elasticsearch/elasticsearch.yml

# restart elasticsearch
systemctl restart elasticsearch
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClusterConfig, DnsSettings, ExposureConfig, NodeGroupConfig};

    fn config() -> ClusterConfig {
        ClusterConfig {
            name: "my-cluster".to_string(),
            master: NodeGroupConfig {
                count: 3,
                image: "img".to_string(),
                flavor: "f".to_string(),
                key_pair: "k".to_string(),
                network: "n".to_string(),
                security_groups: vec![],
                volume_size_gb: 30,
            },
            data: NodeGroupConfig {
                count: 2,
                image: "img".to_string(),
                flavor: "f".to_string(),
                key_pair: "k".to_string(),
                network: "n".to_string(),
                security_groups: vec![],
                volume_size_gb: 30,
            },
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

    #[test]
    fn test_first_master_bootstraps_alone() {
        let node = NodeConfig::for_role(NodeRole::Master, &config(), &[]);

        assert!(node.bootstrap_initial_masters);
        assert_eq!(node.seed_hosts, vec![SeedHost::SelfAddress]);

        let directives = node.cluster_directives();
        assert!(directives.contains("cluster.initial_master_nodes: [$(curl"));
        assert!(directives.contains("discovery.seed_hosts: [$(curl"));
    }

    #[test]
    fn test_joining_master_never_bootstraps() {
        let seeds = vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()];
        let node = NodeConfig::for_role(NodeRole::Master, &config(), &seeds);

        assert!(!node.bootstrap_initial_masters);
        assert_eq!(
            node.seed_hosts,
            vec![
                SeedHost::Address("10.0.0.1".to_string()),
                SeedHost::Address("10.0.0.2".to_string()),
                SeedHost::SelfAddress,
            ]
        );

        let directives = node.cluster_directives();
        assert!(!directives.contains("cluster.initial_master_nodes"));
        assert!(directives.contains(
            "discovery.seed_hosts: [10.0.0.1,10.0.0.2,$(curl 169.254.169.254/2009-04-04/meta-data/local-ipv4)]"
        ));
    }

    #[test]
    fn test_data_node_uses_seeds_exactly() {
        let seeds = vec![
            "10.0.0.1".to_string(),
            "10.0.0.2".to_string(),
            "10.0.0.3".to_string(),
        ];
        let node = NodeConfig::for_role(NodeRole::Data, &config(), &seeds);

        assert!(!node.bootstrap_initial_masters);
        assert_eq!(node.seed_hosts.len(), 3);
        assert!(!node.seed_hosts.contains(&SeedHost::SelfAddress));

        let directives = node.cluster_directives();
        assert!(directives.contains("discovery.seed_hosts: [10.0.0.1,10.0.0.2,10.0.0.3]"));
        assert!(directives.contains("node.roles: [\"data\"]"));
    }

    #[test]
    fn test_bootstrap_set_exactly_once_across_masters() {
        let cfg = config();
        let mut seeds: Vec<String> = Vec::new();
        let mut bootstrap_count = 0;

        for i in 0..3 {
            let node = NodeConfig::for_role(NodeRole::Master, &cfg, &seeds);
            if node.bootstrap_initial_masters {
                bootstrap_count += 1;
            }
            seeds.push(format!("10.0.0.{}", i + 1));
        }

        assert_eq!(bootstrap_count, 1);
    }

    #[test]
    fn test_security_disabled_by_default() {
        let node = NodeConfig::for_role(NodeRole::Master, &config(), &[]);
        let directives = node.cluster_directives();

        assert!(directives.contains("xpack.security.enabled: false"));
        assert!(directives.contains("xpack.security.transport.ssl.enabled: false"));
        assert!(directives.contains("xpack.security.http.ssl.enabled: false"));
    }

    #[test]
    fn test_security_toggle_drops_disable_lines() {
        let mut cfg = config();
        cfg.security_enabled = true;
        let node = NodeConfig::for_role(NodeRole::Master, &cfg, &[]);

        assert!(!node.cluster_directives().contains("xpack.security"));
    }

    #[test]
    fn test_payload_carries_os_preparation() {
        let node = NodeConfig::for_role(NodeRole::Master, &config(), &[]);
        let payload = node.render_payload().unwrap();

        assert!(payload.starts_with("#!/bin/sh"));
        assert!(payload.contains("apt-get install -y elasticsearch"));
        assert!(payload.contains("mkfs -t xfs /dev/vdb"));
        assert!(payload.contains("'/dev/vdb /var/lib/elasticsearch xfs defaults 0 0' >> /etc/fstab"));
        assert!(payload.contains("vm.max_map_count=262144"));
        assert!(payload.contains("systemctl restart elasticsearch"));
    }

    #[test]
    fn test_payload_embeds_directives_before_restart() {
        let node = NodeConfig::for_role(NodeRole::Data, &config(), &["10.0.0.1".to_string()]);
        let payload = node.render_payload().unwrap();

        let config_pos = payload.find("cluster.name: my-cluster").unwrap();
        let restart_pos = payload.find("systemctl restart").unwrap();
        assert!(config_pos < restart_pos);

        // heredoc terminator sits on its own line
        assert!(payload.contains("node.roles: [\"data\"]\nEOF"));
    }
}
