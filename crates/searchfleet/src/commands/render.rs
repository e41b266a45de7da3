//! `sfleet render` — print the bootstrap payload a node would boot with
//!
//! Seed addresses are only known once the preceding masters exist, so
//! they are shown as placeholders here.

use crate::settings;
use anyhow::bail;
use searchfleet_core::{NodeConfig, NodeRole};
use std::path::Path;

pub fn run(config_path: Option<&Path>, role: &str, index: u32) -> anyhow::Result<()> {
    let config = settings::load_settings(config_path)?;

    let role = match role {
        "master" => NodeRole::Master,
        "data" => NodeRole::Data,
        other => bail!("unknown role `{other}` (expected `master` or `data`)"),
    };

    let count = config.group(role).count;
    if index >= count {
        bail!("only {count} {role} node(s) configured, index {index} is out of range");
    }

    // Master i sees masters 0..i; data nodes see the full master set.
    let seed_count = match role {
        NodeRole::Master => index,
        NodeRole::Data => config.master.count,
    };
    let seeds: Vec<String> = (0..seed_count)
        .map(|i| format!("<{}-master-{}-address>", config.name, i))
        .collect();

    let node = NodeConfig::for_role(role, &config, &seeds);
    print!("{}", node.render_payload()?);

    Ok(())
}
