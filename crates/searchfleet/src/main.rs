mod commands;
mod settings;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sfleet")]
#[command(about = "Provision search clusters on OpenStack from a fleet.kdl definition", long_about = None)]
struct Cli {
    /// Path to the settings file (overrides discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resources a deployment would create
    Plan {
        /// Print the full build graph as JSON
        #[arg(long)]
        json: bool,
    },
    /// Provision the cluster on OpenStack
    Up {
        /// Named cloud from clouds.yaml (OS_CLOUD)
        #[arg(long, env = "OS_CLOUD")]
        cloud: Option<String>,
    },
    /// Print the bootstrap payload a node would boot with
    Render {
        /// Node role (master or data)
        role: String,
        /// 0-based node index within the role
        index: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Plan { json } => commands::plan::run(config_path, json).await,
        Commands::Up { cloud } => commands::up::run(config_path, cloud).await,
        Commands::Render { role, index } => commands::render::run(config_path, &role, index),
    }
}
