//! Bounded retry around `CloudProvider::apply`

use crate::error::{DeployError, Result};
use clusterflow_cloud::CloudProvider;
use std::path::{Path, PathBuf};

/// Exit code used when apply keeps failing and the run must stop in place
pub const BREAK_ON_FAILURE_EXIT_CODE: i32 = 3;

/// Process termination hook
pub type HaltFn = fn(i32) -> !;

#[derive(Debug, Clone, Copy)]
pub struct ApplyDriver {
    retries: u32,
    break_on_failure: bool,
    halt: HaltFn,
}

impl ApplyDriver {
    pub fn new(retries: u32, break_on_failure: bool) -> Self {
        Self {
            retries,
            break_on_failure,
            halt: std::process::exit,
        }
    }

    pub fn with_halt(mut self, halt: HaltFn) -> Self {
        self.halt = halt;
        self
    }

    /// First attempt plus retries
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Apply until success or the attempts run out.
    ///
    /// Attempts run back to back. Provider output is logged once after the
    /// final attempt, successful or not. With `break_on_failure` the halt hook
    /// runs instead of returning so the half-built resources stay in place.
    pub async fn run(&self, provider: &dyn CloudProvider, workspace: &Path) -> Result<PathBuf> {
        let max_attempts = self.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::info!(provider = provider.name(), attempt, max_attempts, "Running terraform apply");

            match provider.apply(workspace).await {
                Ok(state) => {
                    log_output(provider, workspace).await;
                    tracing::info!(state = %state.display(), attempt, "Terraform apply succeeded");
                    return Ok(state);
                }
                Err(e) if attempt < max_attempts => {
                    tracing::warn!(attempt, max_attempts, error = %e, "Terraform apply failed, retrying");
                }
                Err(e) => {
                    log_output(provider, workspace).await;
                    if self.break_on_failure {
                        tracing::error!(
                            attempts = attempt,
                            error = %e,
                            "Terraform apply failed. Inspect the cluster and delete the resources manually"
                        );
                        (self.halt)(BREAK_ON_FAILURE_EXIT_CODE);
                    }
                    return Err(DeployError::Apply {
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }
}

async fn log_output(provider: &dyn CloudProvider, workspace: &Path) {
    match provider.output(workspace).await {
        Ok(raw) => tracing::info!(output = %raw, "Terraform output"),
        Err(e) => tracing::warn!(error = %e, "Failed to read terraform output"),
    }
}
