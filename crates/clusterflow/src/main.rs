mod commands;
mod config;

use clap::{Args, Parser, Subcommand};
use clusterflow_core::Deployer;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clusterflow")]
#[command(about = "Provision, configure and verify Kubernetes clusters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    overrides: Overrides,
}

/// Settings layered on top of the config file
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Config file (discovered from the current directory when omitted)
    #[arg(short, long, global = true, env = "CLUSTERFLOW_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Cloud provider (powervs, vpc)
    #[arg(short, long, global = true, env = "CLUSTERFLOW_PROVIDER")]
    pub provider: Option<String>,

    /// Cluster name, also the workspace directory name
    #[arg(long, global = true, env = "CLUSTERFLOW_CLUSTER_NAME")]
    pub cluster_name: Option<String>,

    /// Additional terraform apply attempts after a failure
    #[arg(long, global = true, env = "CLUSTERFLOW_RETRY_ON_TF_FAILURE")]
    pub retry_on_tf_failure: Option<u32>,

    /// Exit immediately, leaving resources in place, when apply keeps failing
    #[arg(long, global = true, env = "CLUSTERFLOW_BREAK_ON_UPFAIL")]
    pub break_on_upfail: bool,

    /// Reuse an existing cluster directory (needed for `down` after `up`)
    #[arg(long, global = true, env = "CLUSTERFLOW_IGNORE_CLUSTER_DIR")]
    pub ignore_cluster_dir: bool,

    /// Extra playbook variable, KEY=VALUE (repeatable)
    #[arg(short = 'e', long = "extra-vars", global = true, value_name = "KEY=VALUE")]
    pub extra_vars: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the infrastructure and install Kubernetes
    Up,
    /// Destroy the infrastructure
    Down,
    /// Check whether the cluster answers with nodes
    IsUp,
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if matches!(cli.command, Commands::Version) {
        println!("clusterflow {}", Deployer::version());
        return Ok(());
    }

    let config = config::load(&cli.overrides)?;
    let deployer = Deployer::new(config);

    match cli.command {
        Commands::Up => commands::up::handle(deployer).await,
        Commands::Down => commands::down::handle(deployer).await,
        Commands::IsUp => commands::is_up::handle(deployer).await,
        Commands::Version => Ok(()),
    }
}
