//! Cluster health probing

use crate::error::HealthError;
use crate::kubeconfig::KUBECONFIG_ENV;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Captured result of one kubectl invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProbeOutput {
    /// Combined output lines, stdout first
    pub fn lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .chain(self.stderr.lines())
            .map(String::from)
            .collect()
    }
}

impl From<std::process::Output> for ProbeOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Read access to a running cluster.
///
/// `kubeconfig` is passed to the child process only; the parent environment
/// is never touched.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// List node names
    async fn list_nodes(&self, kubeconfig: Option<&Path>) -> std::io::Result<ProbeOutput>;

    /// Dump cluster state into `dir`
    async fn dump_cluster_info(
        &self,
        kubeconfig: Option<&Path>,
        dir: &Path,
    ) -> std::io::Result<ProbeOutput>;
}

/// kubectl CLI client
#[derive(Debug, Clone)]
pub struct Kubectl {
    binary: String,
}

impl Kubectl {
    pub fn new() -> Self {
        Self {
            binary: "kubectl".to_string(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    async fn run(&self, kubeconfig: Option<&Path>, args: &[&str]) -> std::io::Result<ProbeOutput> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        if let Some(path) = kubeconfig {
            cmd.env(KUBECONFIG_ENV, path);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: {} {}", self.binary, args.join(" "));
        Ok(cmd.output().await?.into())
    }
}

impl Default for Kubectl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClusterClient for Kubectl {
    async fn list_nodes(&self, kubeconfig: Option<&Path>) -> std::io::Result<ProbeOutput> {
        self.run(kubeconfig, &["get", "nodes", "-o=name"]).await
    }

    async fn dump_cluster_info(
        &self,
        kubeconfig: Option<&Path>,
        dir: &Path,
    ) -> std::io::Result<ProbeOutput> {
        let dir = dir.to_string_lossy().into_owned();
        self.run(
            kubeconfig,
            &["cluster-info", "dump", "--output-directory", dir.as_str()],
        )
        .await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Up { nodes: Vec<String> },
    Down,
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, HealthStatus::Up { .. })
    }
}

/// Probe the cluster.
///
/// A failed probe is an error carrying the captured lines. A successful
/// probe that lists no nodes means the cluster is down.
pub async fn check(
    client: &dyn ClusterClient,
    kubeconfig: Option<&Path>,
) -> Result<HealthStatus, HealthError> {
    let output = client.list_nodes(kubeconfig).await?;

    if !output.success {
        return Err(HealthError::ProbeFailed {
            code: output.code,
            lines: output.lines(),
        });
    }

    let nodes: Vec<String> = output.stdout.lines().map(String::from).collect();
    if nodes.is_empty() {
        return Ok(HealthStatus::Down);
    }
    Ok(HealthStatus::Up { nodes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockClusterClient;

    #[tokio::test]
    async fn test_nodes_listed_means_up() {
        let client = MockClusterClient::responding(ProbeOutput {
            success: true,
            code: Some(0),
            stdout: "node/master-0\nnode/worker-0\n".into(),
            stderr: String::new(),
        });

        let status = check(&client, None).await.unwrap();
        assert_eq!(
            status,
            HealthStatus::Up {
                nodes: vec!["node/master-0".into(), "node/worker-0".into()]
            }
        );
        assert!(status.is_up());
    }

    #[tokio::test]
    async fn test_success_without_lines_means_down() {
        let client = MockClusterClient::responding(ProbeOutput {
            success: true,
            code: Some(0),
            ..Default::default()
        });
        assert_eq!(check(&client, None).await.unwrap(), HealthStatus::Down);
    }

    #[tokio::test]
    async fn test_failure_carries_captured_lines() {
        let client = MockClusterClient::responding(ProbeOutput {
            success: false,
            code: Some(1),
            stdout: String::new(),
            stderr: "The connection to the server was refused\nretry later\n".into(),
        });

        match check(&client, None).await {
            Err(HealthError::ProbeFailed { code, lines }) => {
                assert_eq!(code, Some(1));
                assert_eq!(lines.len(), 2);
                assert!(lines[0].contains("refused"));
            }
            other => panic!("Expected ProbeFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_kubeconfig_is_forwarded() {
        let client = MockClusterClient::responding(ProbeOutput {
            success: true,
            ..Default::default()
        });
        check(&client, Some(Path::new("/tmp/ci-k8s/kubeconfig")))
            .await
            .unwrap();
        assert_eq!(
            client.last_kubeconfig().as_deref(),
            Some(Path::new("/tmp/ci-k8s/kubeconfig"))
        );
    }

    #[tokio::test]
    async fn test_missing_kubectl_is_a_spawn_error() {
        let client = Kubectl::new().with_binary("clusterflow-no-such-kubectl");
        assert!(matches!(
            check(&client, None).await,
            Err(HealthError::Spawn(_))
        ));
    }
}
