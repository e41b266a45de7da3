//! `sfleet up` — provision the cluster on OpenStack

use crate::settings;
use anyhow::bail;
use colored::Colorize;
use searchfleet_cloud::{CloudProvider, deploy};
use searchfleet_cloud_openstack::OpenStackProvider;
use std::path::Path;

pub async fn run(config_path: Option<&Path>, cloud: Option<String>) -> anyhow::Result<()> {
    let config = settings::load_settings(config_path)?;

    let provider = OpenStackProvider::new(cloud);

    let auth = provider
        .check_auth()
        .await
        .map_err(|e| anyhow::anyhow!("authentication check failed: {e}"))?;
    if !auth.authenticated {
        bail!(
            "OpenStack authentication failed: {}",
            auth.error.unwrap_or_else(|| "unknown reason".to_string())
        );
    }
    if let Some(account) = &auth.account_info {
        println!("authenticated: {}", account.dimmed());
    }

    println!(
        "{}",
        format!(
            "provisioning cluster {} ({} master, {} data)...",
            config.name, config.master.count, config.data.count
        )
        .bold()
    );

    let deployment = deploy(&provider, &config).await?;

    println!();
    for node in &deployment.topology.masters {
        println!(
            "  {} master {} {} ({})",
            "✓".green(),
            node.index,
            node.address,
            node.server_id.dimmed()
        );
    }
    for node in &deployment.topology.data_nodes {
        println!(
            "  {} data {} {} ({})",
            "✓".green(),
            node.index,
            node.address,
            node.server_id.dimmed()
        );
    }

    println!();
    println!("{}", deployment.graph.summary().to_string().dimmed());
    println!(
        "{} endpoint {} -> {}",
        "✓".green(),
        deployment.dns.record_name.cyan(),
        deployment.endpoint.vip_address
    );

    Ok(())
}
