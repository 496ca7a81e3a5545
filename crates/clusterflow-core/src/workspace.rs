//! Per-cluster working directory
//!
//! Everything a run produces (variable files, terraform state, inventory,
//! playbook variables, instance list) lives in one directory named after the
//! cluster.

use crate::error::{DeployError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// Create `<root>/<cluster_name>`.
    ///
    /// An existing directory is an error unless `reuse_existing` is set.
    pub async fn create(root: &Path, cluster_name: &str, reuse_existing: bool) -> Result<Self> {
        let path = root.join(cluster_name);
        let io_err = |source| DeployError::Workspace {
            path: path.clone(),
            source,
        };

        if !root.as_os_str().is_empty() {
            tokio::fs::create_dir_all(root).await.map_err(io_err)?;
        }

        match tokio::fs::create_dir(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Created cluster directory");
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if !reuse_existing || !path.is_dir() {
                    return Err(DeployError::WorkspaceExists(path));
                }
                tracing::warn!(path = %path.display(), "Reusing existing cluster directory");
            }
            Err(e) => return Err(io_err(e)),
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }
}

impl AsRef<Path> for Workspace {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
