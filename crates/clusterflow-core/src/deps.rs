//! External tool availability

use crate::error::{DeployError, Result};
use tokio::process::Command;

/// Tools the pipeline shells out to
pub const REQUIRED_TOOLS: [&str; 3] = ["terraform", "ansible-playbook", "kubectl"];

/// Check that every tool resolves through `which`
pub async fn check_dependencies(tools: &[&str]) -> Result<()> {
    for tool in tools {
        let found = Command::new("which")
            .arg(tool)
            .output()
            .await
            .map(|out| out.status.success())
            .unwrap_or(false);

        if !found {
            return Err(DeployError::MissingDependency(tool.to_string()));
        }
        tracing::debug!(tool, "Found dependency");
    }
    Ok(())
}
