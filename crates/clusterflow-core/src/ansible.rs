//! Playbook execution

use crate::error::{DeployError, Result};
use crate::vars::AnsibleVars;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Runs a configuration playbook against a rendered inventory
#[async_trait]
pub trait PlaybookRunner: Send + Sync {
    async fn run(
        &self,
        workspace: &Path,
        inventory: &Path,
        playbook: &str,
        vars: &AnsibleVars,
    ) -> Result<()>;
}

/// `ansible-playbook` CLI runner.
///
/// Output is streamed straight to the terminal; a playbook run is long and
/// its progress is the main feedback the operator gets.
#[derive(Debug, Clone)]
pub struct AnsiblePlaybook {
    binary: String,
}

impl AnsiblePlaybook {
    pub fn new() -> Self {
        Self {
            binary: "ansible-playbook".to_string(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl Default for AnsiblePlaybook {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaybookRunner for AnsiblePlaybook {
    async fn run(
        &self,
        workspace: &Path,
        inventory: &Path,
        playbook: &str,
        vars: &AnsibleVars,
    ) -> Result<()> {
        let abs = |p: &Path| {
            std::path::absolute(p).map_err(|e| DeployError::Playbook(format!("{}: {}", p.display(), e)))
        };
        let vars_file = abs(&vars.write(workspace).await?)?;
        let inventory = abs(inventory)?;
        let playbook = abs(Path::new(playbook))?;

        tracing::info!(
            playbook = %playbook.display(),
            inventory = %inventory.display(),
            "Running ansible-playbook"
        );

        let status = Command::new(&self.binary)
            .current_dir(workspace)
            .arg("-i")
            .arg(&inventory)
            .arg(&playbook)
            .arg("--extra-vars")
            .arg(format!("@{}", vars_file.display()))
            .env("ANSIBLE_HOST_KEY_CHECKING", "False")
            .status()
            .await
            .map_err(|e| DeployError::Playbook(format!("failed to start {}: {}", self.binary, e)))?;

        if !status.success() {
            return Err(DeployError::Playbook(format!(
                "{} exited with {}",
                playbook.display(),
                status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vars::EXTRA_VARS_FILE;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_binary_is_a_playbook_error() {
        let temp_dir = tempdir().unwrap();
        let runner = AnsiblePlaybook::new().with_binary("clusterflow-no-such-ansible");

        let err = runner
            .run(
                temp_dir.path(),
                &temp_dir.path().join("hosts"),
                "install-k8s.yml",
                &AnsibleVars::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.phase(), "configure");
        // variables are written before the playbook starts
        assert!(temp_dir.path().join(EXTRA_VARS_FILE).exists());
    }
}
