//! `sfleet plan` — simulate a deployment and show the build graph

use crate::settings;
use colored::Colorize;
use searchfleet_cloud::{DryRunProvider, deploy};
use std::path::Path;

pub async fn run(config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = settings::load_settings(config_path)?;

    let provider = DryRunProvider::new();
    let deployment = deploy(&provider, &config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(deployment.graph.nodes())?);
        return Ok(());
    }

    println!("{}", format!("cluster {}", config.name).bold());
    println!(
        "  {} master node(s), {} data node(s)",
        config.master.count, config.data.count
    );
    println!();

    for node in deployment.graph.nodes() {
        println!("  {} {} {}", "+".green(), node.kind, node.name.dimmed());
    }

    println!();
    println!("{}", deployment.graph.summary().to_string().bold());
    println!(
        "endpoint record: {} (bound to the load balancer address at create time)",
        config.dns.record_name().cyan()
    );

    Ok(())
}
