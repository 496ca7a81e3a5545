//! Cluster lifecycle orchestration
//!
//! ```text
//! init ─▶ tfvars ─▶ apply (retry) ─▶ output ─▶ normalize ─▶ hosts
//!                                                           │
//!   logs ◀─ health ◀─ kubeconfig ◀─ playbook ◀─ extra-vars ◀┘
//! ```
//!
//! Every phase runs to completion before the next one starts. A failure before
//! the health check aborts `up` with an error tagged by its phase; the health
//! check and log collection only warn.

use crate::ansible::{AnsiblePlaybook, PlaybookRunner};
use crate::apply::{ApplyDriver, HaltFn};
use crate::deps::{REQUIRED_TOOLS, check_dependencies};
use crate::error::{DeployError, Result};
use crate::health::{self, ClusterClient, HealthStatus, Kubectl};
use crate::inventory::InventoryBuilder;
use crate::kubeconfig::{KUBECONFIG_ENV, rewrite_kubeconfig};
use crate::logs::collect_cluster_logs;
use crate::vars::AnsibleVars;
use crate::workspace::Workspace;
use clusterflow_cloud::terraform::{COMMON_VAR_FILE, write_var_file};
use clusterflow_cloud::{
    CloudError, CloudProvider, ProviderKind, RawOutput, extract_all_instances,
};
use clusterflow_cloud_powervs::PowerVsProvider;
use clusterflow_cloud_vpc::VpcProvider;
use clusterflow_config::ClusterflowConfig;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const INSTANCE_LIST_FILE: &str = "instance_list.json";
pub const KUBECONFIG_FILE: &str = "kubeconfig";

/// Last completed step of the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initialized,
    InfraApplied,
    InventoryReady,
    Configured,
    EndpointRewritten,
    Verified,
    Failed,
}

struct Session {
    provider: Arc<dyn CloudProvider>,
    workspace: Workspace,
}

enum InitState {
    Pending,
    Ready(Session),
    Failed(String),
}

/// Select the provider named by `deployer.target_provider`
pub fn build_provider(config: &ClusterflowConfig) -> Result<Arc<dyn CloudProvider>> {
    let kind: ProviderKind = config
        .deployer
        .target_provider
        .parse()
        .map_err(|e: CloudError| DeployError::Init(e.to_string()))?;
    let module_dir = config.deployer.terraform_dir.clone();

    let provider: Arc<dyn CloudProvider> = match kind {
        ProviderKind::PowerVs => Arc::new(
            PowerVsProvider::new(config.powervs.clone(), module_dir)
                .map_err(|e| DeployError::Init(e.to_string()))?,
        ),
        ProviderKind::Vpc => Arc::new(
            VpcProvider::new(config.vpc.clone(), module_dir)
                .map_err(|e| DeployError::Init(e.to_string()))?,
        ),
    };
    Ok(provider)
}

pub struct Deployer {
    config: ClusterflowConfig,
    work_root: PathBuf,
    provider: Option<Arc<dyn CloudProvider>>,
    playbook: Arc<dyn PlaybookRunner>,
    cluster: Arc<dyn ClusterClient>,
    halt: HaltFn,
    publish_env: bool,
    init: InitState,
    phase: Phase,
    kubeconfig: Option<PathBuf>,
}

impl Deployer {
    pub fn new(config: ClusterflowConfig) -> Self {
        Self {
            config,
            work_root: PathBuf::from("."),
            provider: None,
            playbook: Arc::new(AnsiblePlaybook::new()),
            cluster: Arc::new(Kubectl::new()),
            halt: std::process::exit,
            publish_env: false,
            init: InitState::Pending,
            phase: Phase::Uninitialized,
            kubeconfig: None,
        }
    }

    /// Directory the cluster workspace is created in
    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = root.into();
        self
    }

    /// Use this provider instead of the one named in the config
    pub fn with_provider(mut self, provider: Arc<dyn CloudProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_playbook_runner(mut self, runner: Arc<dyn PlaybookRunner>) -> Self {
        self.playbook = runner;
        self
    }

    pub fn with_cluster_client(mut self, client: Arc<dyn ClusterClient>) -> Self {
        self.cluster = client;
        self
    }

    pub fn with_halt(mut self, halt: HaltFn) -> Self {
        self.halt = halt;
        self
    }

    /// Export `KUBECONFIG` into the process environment after the rewrite
    pub fn publish_env(mut self, publish: bool) -> Self {
        self.publish_env = publish;
        self
    }

    pub fn config(&self) -> &ClusterflowConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Rewritten kubeconfig, once `up` got that far
    pub fn kubeconfig(&self) -> Option<&Path> {
        self.kubeconfig.as_deref()
    }

    pub fn workspace(&self) -> Option<&Path> {
        match &self.init {
            InitState::Ready(session) => Some(session.workspace.path()),
            _ => None,
        }
    }

    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// One-shot initialization.
    ///
    /// The first call checks dependencies, selects the provider and creates
    /// the workspace. Later calls return the cached outcome.
    pub async fn init(&mut self) -> Result<()> {
        match &self.init {
            InitState::Ready(_) => return Ok(()),
            InitState::Failed(message) => return Err(DeployError::Init(message.clone())),
            InitState::Pending => {}
        }

        match self.initialize().await {
            Ok(session) => {
                tracing::info!(
                    cluster = %self.config.common.cluster_name,
                    provider = session.provider.name(),
                    workspace = %session.workspace.path().display(),
                    "Initialized deployer"
                );
                self.init = InitState::Ready(session);
                self.phase = Phase::Initialized;
                Ok(())
            }
            Err(e) => {
                tracing::error!(phase = e.phase(), error = %e, "Initialization failed");
                self.init = InitState::Failed(e.to_string());
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    async fn initialize(&mut self) -> Result<Session> {
        if self.config.deployer.check_dependencies {
            check_dependencies(&REQUIRED_TOOLS).await?;
        }

        let provider = match &self.provider {
            Some(provider) => Arc::clone(provider),
            None => build_provider(&self.config)?,
        };

        let workspace = Workspace::create(
            &self.work_root,
            &self.config.common.cluster_name,
            self.config.deployer.ignore_cluster_dir,
        )
        .await?;

        let kubeconfig = self.resolved_kubeconfig();
        let kubeconfig = std::path::absolute(&kubeconfig).map_err(|source| {
            DeployError::Workspace {
                path: kubeconfig.clone(),
                source,
            }
        })?;
        self.config.common.kubeconfig_path = kubeconfig.display().to_string();

        Ok(Session {
            provider,
            workspace,
        })
    }

    /// Configured kubeconfig, or `<work_root>/<cluster_name>/kubeconfig` when
    /// none is set
    fn resolved_kubeconfig(&self) -> PathBuf {
        match self.config.common.kubeconfig_path.trim() {
            "" => self
                .work_root
                .join(&self.config.common.cluster_name)
                .join(KUBECONFIG_FILE),
            configured => PathBuf::from(configured),
        }
    }

    fn session(&self) -> Result<(Arc<dyn CloudProvider>, Workspace)> {
        match &self.init {
            InitState::Ready(session) => {
                Ok((Arc::clone(&session.provider), session.workspace.clone()))
            }
            InitState::Failed(message) => Err(DeployError::Init(message.clone())),
            InitState::Pending => Err(DeployError::Init("deployer is not initialized".into())),
        }
    }

    /// Provision, configure and verify the cluster
    #[tracing::instrument(skip(self), fields(cluster = %self.config.common.cluster_name))]
    pub async fn up(&mut self) -> Result<()> {
        // no workspace yet, so there is nowhere to collect logs into
        self.init().await?;

        let result = self.run_up().await;
        if let Err(e) = &result {
            self.phase = Phase::Failed;
            tracing::error!(phase = e.phase(), error = %e, "Cluster deployment failed");
        }

        let kubeconfig = self.probe_kubeconfig();
        if let Err(e) = collect_cluster_logs(
            self.cluster.as_ref(),
            kubeconfig.as_deref(),
            &self.config.deployer.logs_dir,
        )
        .await
        {
            tracing::warn!(error = %e, "Log collection failed");
        }

        result
    }

    async fn run_up(&mut self) -> Result<()> {
        let (provider, workspace) = self.session()?;

        self.dump_common_vars(&workspace).await?;
        let var_file = provider
            .dump_config(workspace.path())
            .await
            .map_err(|e| DeployError::DumpConfig(e.to_string()))?;
        tracing::debug!(path = %var_file.display(), "Dumped provider variables");

        ApplyDriver::new(
            self.config.deployer.retry_on_tf_failure,
            self.config.deployer.break_on_upfail,
        )
        .with_halt(self.halt)
        .run(provider.as_ref(), workspace.path())
        .await?;
        self.phase = Phase::InfraApplied;

        let raw = provider
            .output(workspace.path())
            .await
            .map_err(DeployError::Output)?;
        let inventory = provider.normalize(&raw).map_err(DeployError::Normalize)?;
        tracing::info!(%inventory, "Provisioned nodes");

        if self.config.deployer.fetch_instance_data {
            write_instance_list(&raw, &workspace).await?;
        }

        let hosts = InventoryBuilder::new()
            .write(&inventory, workspace.path())
            .await?;
        self.phase = Phase::InventoryReady;

        let provider_vars = provider
            .variables()
            .map_err(|e| DeployError::Vars(e.to_string()))?;
        let vars = AnsibleVars::build(
            &provider_vars,
            &self.config.common,
            &inventory,
            &self.config.deployer.extra_vars,
        )?;
        self.playbook
            .run(
                workspace.path(),
                &hosts,
                &self.config.deployer.playbook,
                &vars,
            )
            .await?;
        self.phase = Phase::Configured;

        if self.config.deployer.set_kubeconfig {
            let control_plane = inventory
                .control_plane()
                .ok_or_else(|| DeployError::Normalize(CloudError::EmptyRole("masters".into())))?;
            let path =
                rewrite_kubeconfig(Path::new(&self.config.common.kubeconfig_path), control_plane)
                    .await?;
            if self.publish_env {
                // SAFETY: phases run one at a time, no child process is being
                // spawned while the variable is set.
                unsafe { std::env::set_var(KUBECONFIG_ENV, &path) };
            }
            self.kubeconfig = Some(path);
            self.phase = Phase::EndpointRewritten;
        }

        let kubeconfig = self.probe_kubeconfig();
        match health::check(self.cluster.as_ref(), kubeconfig.as_deref()).await {
            Ok(HealthStatus::Up { nodes }) => {
                tracing::info!(nodes = nodes.len(), "Cluster is up");
                self.phase = Phase::Verified;
            }
            Ok(HealthStatus::Down) => {
                tracing::error!("Cluster reports no nodes");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Health check failed");
            }
        }

        Ok(())
    }

    async fn dump_common_vars(&self, workspace: &Workspace) -> Result<()> {
        let fields = match serde_json::to_value(&self.config.common) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => {
                return Err(DeployError::DumpConfig(
                    "common settings must serialize to a map".into(),
                ));
            }
            Err(e) => return Err(DeployError::DumpConfig(e.to_string())),
        };
        let vars = fields
            .into_iter()
            .filter(|(_, v)| v.as_str() != Some(""))
            .collect();

        write_var_file(&workspace.join(COMMON_VAR_FILE), &vars)
            .await
            .map_err(|e| DeployError::DumpConfig(e.to_string()))
    }

    /// Tear the cluster down
    #[tracing::instrument(skip(self), fields(cluster = %self.config.common.cluster_name))]
    pub async fn down(&mut self) -> Result<()> {
        self.init().await?;
        let (provider, workspace) = self.session()?;

        match provider.destroy(workspace.path()).await {
            Ok(()) => {
                tracing::info!("Cluster destroyed");
                Ok(())
            }
            Err(e) if self.config.common.ignore_destroy => {
                tracing::warn!(error = %e, "Terraform destroy failed, ignoring");
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Failed;
                tracing::error!(error = %e, "Terraform destroy failed");
                Err(DeployError::Destroy(e))
            }
        }
    }

    /// `Ok(false)` when the cluster answers with no nodes
    pub async fn is_up(&self) -> Result<bool> {
        let kubeconfig = self.probe_kubeconfig();
        let status = health::check(self.cluster.as_ref(), kubeconfig.as_deref()).await?;
        Ok(status.is_up())
    }

    /// Kubeconfig handed to kubectl.
    ///
    /// The rewritten file wins. Otherwise an inherited `KUBECONFIG` is left to
    /// the child process, and the resolved path is the last resort, so a fresh
    /// deployer probes the same file `up` rewrote.
    fn probe_kubeconfig(&self) -> Option<PathBuf> {
        if let Some(path) = &self.kubeconfig {
            return Some(path.clone());
        }
        if std::env::var_os(KUBECONFIG_ENV).is_some() {
            return None;
        }
        let resolved = self.resolved_kubeconfig();
        Some(std::path::absolute(&resolved).unwrap_or(resolved))
    }
}

async fn write_instance_list(raw: &RawOutput, workspace: &Workspace) -> Result<PathBuf> {
    let instances =
        extract_all_instances(raw).map_err(|e| DeployError::InstanceData(e.to_string()))?;
    let path = workspace.join(INSTANCE_LIST_FILE);
    let content = serde_json::to_string_pretty(&instances)
        .map_err(|e| DeployError::InstanceData(e.to_string()))?;
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| DeployError::InstanceData(format!("{}: {}", path.display(), e)))?;

    tracing::info!(path = %path.display(), count = instances.len(), "Wrote instance list");
    Ok(path)
}
