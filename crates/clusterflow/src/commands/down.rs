use clusterflow_core::Deployer;
use colored::Colorize;

pub async fn handle(mut deployer: Deployer) -> anyhow::Result<()> {
    let cluster = deployer.config().common.cluster_name.clone();
    println!("{}", "Tearing the cluster down...".yellow());
    println!("Cluster: {}", cluster.cyan());

    deployer.down().await?;

    println!();
    println!("{}", "✓ Cluster destroyed".green().bold());
    Ok(())
}
