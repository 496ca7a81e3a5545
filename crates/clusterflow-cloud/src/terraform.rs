//! terraform CLI wrapper
//!
//! Every call runs against a module directory with the state file and the
//! variable files kept inside the cluster workspace, so the module itself
//! stays untouched between clusters.

use crate::error::{CloudError, Result};
use crate::output::RawOutput;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

pub const STATE_FILE: &str = "terraform.tfstate";
pub const COMMON_VAR_FILE: &str = "common.tfvars.json";

/// Path of the variable file a provider dumps into the workspace
pub fn provider_var_file(workspace: &Path, provider: &str) -> PathBuf {
    workspace.join(format!("{}.tfvars.json", provider))
}

/// Write a flat variable map as a terraform JSON var file
pub async fn write_var_file(path: &Path, vars: &Map<String, Value>) -> Result<()> {
    let content = serde_json::to_string_pretty(vars)?;
    tokio::fs::write(path, content).await?;
    tracing::debug!(path = %path.display(), count = vars.len(), "Wrote terraform variables");
    Ok(())
}

/// terraform CLI wrapper
#[derive(Debug, Clone)]
pub struct Terraform {
    module_dir: PathBuf,
    binary: String,
}

impl Terraform {
    pub fn new(module_dir: impl Into<PathBuf>) -> Self {
        Self {
            module_dir: module_dir.into(),
            binary: "terraform".to_string(),
        }
    }

    /// Use a different executable (e.g. `tofu`)
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    /// Absolute state path; terraform runs with `-chdir`, so relative paths would move
    pub fn state_path(workspace: &Path) -> Result<PathBuf> {
        Ok(std::path::absolute(workspace.join(STATE_FILE))?)
    }

    fn var_file_args(workspace: &Path, provider: &str) -> Result<Vec<String>> {
        let common = std::path::absolute(workspace.join(COMMON_VAR_FILE))?;
        let provider = std::path::absolute(provider_var_file(workspace, provider))?;
        Ok([common, provider]
            .iter()
            .filter(|p| p.exists())
            .map(|p| format!("-var-file={}", p.display()))
            .collect())
    }

    /// Run a terraform command and return stdout
    async fn run_command(&self, args: &[String]) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(format!("-chdir={}", self.module_dir.display()));
        cmd.args(args);
        cmd.env("TF_IN_AUTOMATION", "1");
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(
            "Running: {} -chdir={} {}",
            self.binary,
            self.module_dir.display(),
            args.join(" ")
        );

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CloudError::CommandFailed(format!(
                "{} {}: {}",
                self.binary,
                args.first().map(String::as_str).unwrap_or_default(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    pub async fn init(&self) -> Result<()> {
        self.run_command(&["init".into(), "-input=false".into()])
            .await?;
        Ok(())
    }

    /// Initialize the module and apply it, returning the state location
    pub async fn apply(&self, workspace: &Path, provider: &str) -> Result<PathBuf> {
        self.init().await?;

        let state = Self::state_path(workspace)?;
        let mut args = vec![
            "apply".to_string(),
            "-auto-approve".to_string(),
            "-input=false".to_string(),
            format!("-state={}", state.display()),
        ];
        args.extend(Self::var_file_args(workspace, provider)?);

        self.run_command(&args).await?;
        Ok(state)
    }

    /// `terraform output -json` for the workspace state
    pub async fn output(&self, workspace: &Path) -> Result<RawOutput> {
        let state = Self::state_path(workspace)?;
        let stdout = self
            .run_command(&[
                "output".to_string(),
                "-json".to_string(),
                format!("-state={}", state.display()),
            ])
            .await?;

        if stdout.trim().is_empty() {
            return Ok(RawOutput::default());
        }

        let output: RawOutput = serde_json::from_str(&stdout)?;
        Ok(output)
    }

    pub async fn destroy(&self, workspace: &Path, provider: &str) -> Result<()> {
        let state = Self::state_path(workspace)?;
        let mut args = vec![
            "destroy".to_string(),
            "-auto-approve".to_string(),
            "-input=false".to_string(),
            format!("-state={}", state.display()),
        ];
        args.extend(Self::var_file_args(workspace, provider)?);

        self.run_command(&args).await?;
        Ok(())
    }
}
