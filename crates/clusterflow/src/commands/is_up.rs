use clusterflow_core::Deployer;
use colored::Colorize;

/// Prints `true`/`false`; a cluster that is down exits non-zero
pub async fn handle(deployer: Deployer) -> anyhow::Result<()> {
    if deployer.is_up().await? {
        println!("{}", "true".green());
        Ok(())
    } else {
        println!("{}", "false".red());
        std::process::exit(1);
    }
}
