//! In-memory doubles for the external tools

use crate::ansible::PlaybookRunner;
use crate::error::{DeployError, Result};
use crate::health::{ClusterClient, ProbeOutput};
use crate::vars::AnsibleVars;
use async_trait::async_trait;
use clusterflow_cloud::{
    CloudError, CloudProvider, NodeInventory, ProviderKind, RawOutput, ShapePolicy, Terraform,
};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

pub(crate) fn sample_output() -> RawOutput {
    RawOutput::from(json!({
        "masters": {"value": "10.0.0.1"},
        "workers": {"value": ["10.0.0.2", "10.0.0.3"]},
    }))
}

pub(crate) struct MockProvider {
    fail_first: u32,
    fail_destroy: bool,
    raw: RawOutput,
    apply_calls: AtomicU32,
    output_calls: AtomicU32,
    destroy_calls: AtomicU32,
}

impl MockProvider {
    pub(crate) fn succeeding() -> Self {
        Self::failing_first(0)
    }

    /// Fail the first `n` applies
    pub(crate) fn failing_first(n: u32) -> Self {
        Self {
            fail_first: n,
            fail_destroy: false,
            raw: sample_output(),
            apply_calls: AtomicU32::new(0),
            output_calls: AtomicU32::new(0),
            destroy_calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn with_output(mut self, raw: RawOutput) -> Self {
        self.raw = raw;
        self
    }

    pub(crate) fn with_failing_destroy(mut self) -> Self {
        self.fail_destroy = true;
        self
    }

    pub(crate) fn apply_calls(&self) -> u32 {
        self.apply_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn output_calls(&self) -> u32 {
        self.output_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn destroy_calls(&self) -> u32 {
        self.destroy_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Vpc
    }

    fn display_name(&self) -> &str {
        "Mock"
    }

    fn variables(&self) -> clusterflow_cloud::Result<Map<String, Value>> {
        let mut vars = Map::new();
        vars.insert("vpc_region".into(), json!("us-south"));
        Ok(vars)
    }

    async fn apply(&self, workspace: &Path) -> clusterflow_cloud::Result<PathBuf> {
        let call = self.apply_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            return Err(CloudError::CommandFailed(format!(
                "terraform apply: attempt {} failed",
                call + 1
            )));
        }
        Terraform::state_path(workspace)
    }

    async fn output(&self, _workspace: &Path) -> clusterflow_cloud::Result<RawOutput> {
        self.output_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.raw.clone())
    }

    async fn destroy(&self, _workspace: &Path) -> clusterflow_cloud::Result<()> {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_destroy {
            return Err(CloudError::CommandFailed("terraform destroy: locked".into()));
        }
        Ok(())
    }

    fn normalize(&self, raw: &RawOutput) -> clusterflow_cloud::Result<NodeInventory> {
        clusterflow_cloud::normalize(raw, ShapePolicy::ScalarTolerant)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PlaybookCall {
    pub inventory: PathBuf,
    pub playbook: String,
    pub vars: AnsibleVars,
}

#[derive(Default)]
pub(crate) struct MockPlaybookRunner {
    fail: bool,
    calls: Mutex<Vec<PlaybookCall>>,
}

impl MockPlaybookRunner {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<PlaybookCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaybookRunner for MockPlaybookRunner {
    async fn run(
        &self,
        workspace: &Path,
        inventory: &Path,
        playbook: &str,
        vars: &AnsibleVars,
    ) -> Result<()> {
        vars.write(workspace).await?;
        self.calls.lock().unwrap().push(PlaybookCall {
            inventory: inventory.to_path_buf(),
            playbook: playbook.to_string(),
            vars: vars.clone(),
        });
        if self.fail {
            return Err(DeployError::Playbook(format!("{} exited with exit status: 2", playbook)));
        }
        Ok(())
    }
}

pub(crate) struct MockClusterClient {
    response: ProbeOutput,
    last_kubeconfig: Mutex<Option<PathBuf>>,
    list_calls: AtomicU32,
    dump_calls: AtomicU32,
}

impl MockClusterClient {
    pub(crate) fn responding(response: ProbeOutput) -> Self {
        Self {
            response,
            last_kubeconfig: Mutex::new(None),
            list_calls: AtomicU32::new(0),
            dump_calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn healthy() -> Self {
        Self::responding(ProbeOutput {
            success: true,
            code: Some(0),
            stdout: "node/master-0\nnode/worker-0\nnode/worker-1\n".into(),
            stderr: String::new(),
        })
    }

    pub(crate) fn last_kubeconfig(&self) -> Option<PathBuf> {
        self.last_kubeconfig.lock().unwrap().clone()
    }

    pub(crate) fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn dump_calls(&self) -> u32 {
        self.dump_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterClient for MockClusterClient {
    async fn list_nodes(&self, kubeconfig: Option<&Path>) -> std::io::Result<ProbeOutput> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_kubeconfig.lock().unwrap() = kubeconfig.map(Path::to_path_buf);
        Ok(self.response.clone())
    }

    async fn dump_cluster_info(
        &self,
        kubeconfig: Option<&Path>,
        _dir: &Path,
    ) -> std::io::Result<ProbeOutput> {
        self.dump_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_kubeconfig.lock().unwrap() = kubeconfig.map(Path::to_path_buf);
        Ok(self.response.clone())
    }
}
