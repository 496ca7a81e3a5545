//! Best-effort cluster log collection

use crate::error::{DeployError, Result};
use crate::health::ClusterClient;
use std::path::{Path, PathBuf};

pub const CLUSTER_INFO_DIR: &str = "cluster-info";

/// Dump cluster state under `<logs_dir>/cluster-info`
pub async fn collect_cluster_logs(
    client: &dyn ClusterClient,
    kubeconfig: Option<&Path>,
    logs_dir: &Path,
) -> Result<PathBuf> {
    let dir = logs_dir.join(CLUSTER_INFO_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| DeployError::Logs(format!("{}: {}", dir.display(), e)))?;

    let output = client
        .dump_cluster_info(kubeconfig, &dir)
        .await
        .map_err(|e| DeployError::Logs(e.to_string()))?;

    if !output.success {
        return Err(DeployError::Logs(format!(
            "kubectl cluster-info dump exited with {:?}: {}",
            output.code,
            output.stderr.trim()
        )));
    }

    tracing::info!(dir = %dir.display(), "Collected cluster logs");
    Ok(dir)
}
