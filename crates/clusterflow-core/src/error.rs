use clusterflow_cloud::CloudError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("initialization failed: {0}")]
    Init(String),

    #[error("missing dependency: {0} not found in PATH")]
    MissingDependency(String),

    #[error("cluster directory already exists: {0}\nhint: pick another cluster name or pass --ignore-cluster-dir")]
    WorkspaceExists(PathBuf),

    #[error("failed to prepare cluster directory: {path}\nreason: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write terraform variables: {0}")]
    DumpConfig(String),

    #[error("terraform apply failed after {attempts} attempt(s): {source}")]
    Apply {
        attempts: u32,
        #[source]
        source: CloudError,
    },

    #[error("failed to read terraform output: {0}")]
    Output(#[source] CloudError),

    #[error("failed to build node inventory: {0}")]
    Normalize(#[source] CloudError),

    #[error("failed to export instance data: {0}")]
    InstanceData(String),

    #[error("failed to write inventory: {0}")]
    Inventory(String),

    #[error("invalid playbook variables: {0}")]
    Vars(String),

    #[error("playbook failed: {0}")]
    Playbook(String),

    #[error(transparent)]
    Kubeconfig(#[from] KubeconfigError),

    #[error(transparent)]
    Health(#[from] HealthError),

    #[error("failed to collect cluster logs: {0}")]
    Logs(String),

    #[error("terraform destroy failed: {0}")]
    Destroy(#[source] CloudError),
}

impl DeployError {
    /// Pipeline phase that produced the error
    pub fn phase(&self) -> &'static str {
        match self {
            DeployError::Init(_) | DeployError::MissingDependency(_) => "init",
            DeployError::WorkspaceExists(_) | DeployError::Workspace { .. } => "workspace",
            DeployError::DumpConfig(_) | DeployError::Apply { .. } | DeployError::Output(_) => {
                "provision"
            }
            DeployError::Normalize(_) | DeployError::InstanceData(_) => "normalize",
            DeployError::Inventory(_) => "inventory",
            DeployError::Vars(_) | DeployError::Playbook(_) => "configure",
            DeployError::Kubeconfig(_) => "kubeconfig",
            DeployError::Health(_) => "verify",
            DeployError::Logs(_) => "logs",
            DeployError::Destroy(_) => "destroy",
        }
    }
}

#[derive(Error, Debug)]
pub enum KubeconfigError {
    #[error("kubeconfig not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to access kubeconfig: {path}\nreason: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse kubeconfig: {path}\nreason: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cluster '{0}' has no server entry")]
    MissingServer(String),

    #[error("invalid server URL '{server}': {reason}")]
    InvalidServer { server: String, reason: String },
}

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("failed to run health probe: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("health probe exited with code {code:?}:\n{}", .lines.join("\n"))]
    ProbeFailed { code: Option<i32>, lines: Vec<String> },
}

pub type Result<T> = std::result::Result<T, DeployError>;
