use anyhow::Context;
use clusterflow_core::Deployer;
use colored::Colorize;

pub async fn handle(deployer: Deployer) -> anyhow::Result<()> {
    // kubectl children started by this process pick up the rewritten file
    let mut deployer = deployer.publish_env(true);
    let cluster = deployer.config().common.cluster_name.clone();
    let provider = deployer.config().deployer.target_provider.clone();
    println!("{}", "Bringing the cluster up...".yellow());
    println!("Cluster:  {}", cluster.cyan());
    println!("Provider: {}", provider.cyan());

    if let Err(e) = deployer.up().await {
        let phase = e.phase();
        println!();
        println!("{}", format!("✗ up failed during {}", phase).red().bold());
        return Err(e).with_context(|| format!("cluster '{}' failed in the {} phase", cluster, phase));
    }

    println!();
    println!("{}", "✓ Cluster is ready".green().bold());
    if let Some(workspace) = deployer.workspace() {
        println!("Workspace: {}", workspace.display());
    }
    if let Some(kubeconfig) = deployer.kubeconfig() {
        println!("export KUBECONFIG={}", kubeconfig.display());
    }
    Ok(())
}
